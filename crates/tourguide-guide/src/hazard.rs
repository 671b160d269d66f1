//! Hazard zones that make the guide call out a warning.

use tourguide_core::Position;
use tourguide_core::ids::AudioClipRef;
use tracing::{debug, info};

use crate::agent::GuideAgent;

/// Seconds before a hazard can warn again.
pub const DEFAULT_WARNING_COOLDOWN: f32 = 3.0;

/// A zone the visitor should not enter. When they do, the guide stops and
/// speaks the warning clip; the zone stays quiet until its cooldown elapses.
///
/// A walk interrupted by the warning is resumed when the cooldown ends, so a
/// pending arrival still reaches whoever is waiting for it.
#[derive(Debug, Clone)]
pub struct HazardWarning {
    clip: AudioClipRef,
    cooldown: f32,
    remaining: Option<f32>,
    interrupted_walk: Option<Position>,
}

impl HazardWarning {
    /// Creates a hazard with the default cooldown.
    #[must_use]
    pub fn new(clip: AudioClipRef) -> Self {
        Self::with_cooldown(clip, DEFAULT_WARNING_COOLDOWN)
    }

    /// Creates a hazard with a custom cooldown in seconds.
    #[must_use]
    pub fn with_cooldown(clip: AudioClipRef, cooldown: f32) -> Self {
        Self {
            clip,
            cooldown: cooldown.max(0.0),
            remaining: None,
            interrupted_walk: None,
        }
    }

    /// Called when the visitor enters the zone. Returns whether a warning was
    /// issued.
    pub fn on_visitor_enter(&mut self, guide: &mut GuideAgent) -> bool {
        if self.is_warning() {
            debug!(clip = %self.clip, "hazard already warning");
            return false;
        }

        let interrupted = guide.pending_destination();
        if let Err(error) = guide.speak(&self.clip) {
            debug!(%error, "hazard warning could not be spoken");
            return false;
        }

        info!(clip = %self.clip, "visitor entered hazard, guide warning");
        self.interrupted_walk = interrupted;
        self.remaining = Some(self.cooldown);
        true
    }

    /// Counts down the cooldown and resumes any interrupted walk when it ends.
    pub fn tick(&mut self, dt: f32, guide: &mut GuideAgent) {
        let Some(remaining) = self.remaining.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return;
        }

        self.remaining = None;
        let Some(destination) = self.interrupted_walk.take() else {
            return;
        };
        if guide.pending_destination() != Some(destination) {
            debug!(?destination, "interrupted walk was abandoned, not resuming");
            return;
        }
        debug!(?destination, "resuming walk after hazard warning");
        if let Err(error) = guide.go_to(destination) {
            debug!(%error, "could not resume walk");
        }
    }

    /// Whether the zone is cooling down after a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.remaining.is_some()
    }
}
