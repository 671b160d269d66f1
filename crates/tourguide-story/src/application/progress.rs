//! Read model of the sequencer's position.

use serde::Serialize;

/// Snapshot of where a story is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryProgress {
    /// Current step index, if the story was ever started.
    pub index: Option<usize>,
    /// Number of steps in the script.
    pub total: usize,
    /// Whether the story is in progress.
    pub running: bool,
    /// Label of the current step.
    pub label: Option<String>,
    /// Tag of the current step.
    pub action: Option<&'static str>,
}

impl StoryProgress {
    /// Whether the cursor has moved past the last step.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.running && self.index.is_some_and(|index| index >= self.total)
    }
}
