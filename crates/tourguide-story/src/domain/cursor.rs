//! Sequencer position and wait tokens.

use std::fmt;

use serde::Serialize;

/// Generation marker for one dispatched step.
///
/// A fresh token is minted for every dispatch. Completions carry the token
/// they were registered with and are honoured only while it is still the
/// cursor's active token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WaitToken(u64);

impl WaitToken {
    /// The generation number.
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WaitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the sequencer is in its script.
#[derive(Debug, Clone, Default)]
pub struct SequencerCursor {
    index: Option<usize>,
    running: bool,
    active_token: Option<WaitToken>,
    generation: u64,
}

impl SequencerCursor {
    /// Current step index: `None` before the first start, the script length
    /// once the script has run out.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Whether a story is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Token of the outstanding wait, if any.
    #[must_use]
    pub fn active_token(&self) -> Option<WaitToken> {
        self.active_token
    }

    /// Whether a completion carrying `token` should be honoured.
    #[must_use]
    pub fn is_current(&self, token: WaitToken) -> bool {
        self.running && self.active_token == Some(token)
    }

    /// Rewinds to before the first step and marks the story running. Token
    /// generations keep counting so tokens from earlier runs stay stale.
    pub(crate) fn reset(&mut self) {
        self.index = None;
        self.running = true;
        self.active_token = None;
    }

    /// Moves to the next index and returns it.
    pub(crate) fn advance(&mut self) -> usize {
        let next = self.index.map_or(0, |index| index + 1);
        self.index = Some(next);
        next
    }

    /// Mints the token for the step being dispatched.
    pub(crate) fn arm(&mut self) -> WaitToken {
        self.generation += 1;
        let token = WaitToken(self.generation);
        self.active_token = Some(token);
        token
    }

    /// Drops the active token so nothing outstanding can complete.
    pub(crate) fn invalidate(&mut self) {
        self.active_token = None;
    }

    /// Marks the story as no longer running.
    pub(crate) fn finish(&mut self) {
        self.running = false;
        self.active_token = None;
    }
}
