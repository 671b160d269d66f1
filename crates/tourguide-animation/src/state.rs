//! Animation states and their behaviour records.

use std::fmt;

use serde::{Deserialize, Serialize};
use tourguide_core::collaborators::AnimatedEntity;

/// Identifies one of the guide's animation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnimationStateId {
    /// Standing still.
    Idle,
    /// Walking along a path.
    Walking,
    /// Speaking to the visitor.
    Talking,
    /// Pointing at a point of interest.
    Pointing,
    /// Celebrating.
    Victory,
    /// Refusing or shaking the head.
    Rejected,
}

impl AnimationStateId {
    /// Every state, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::Walking,
        Self::Talking,
        Self::Pointing,
        Self::Victory,
        Self::Rejected,
    ];

    /// Name of the animator trigger that starts this state's clip.
    #[must_use]
    pub fn trigger_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Walking => "Walking",
            Self::Talking => "Talking",
            Self::Pointing => "Pointing",
            Self::Victory => "Victory",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for AnimationStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trigger_name())
    }
}

/// Runs when a state becomes active.
pub type EnterFn = fn(AnimationStateId, &mut dyn AnimatedEntity);
/// Runs once per frame while a state is active.
pub type TickFn = fn(&mut dyn AnimatedEntity, f32);
/// Runs when a state stops being active.
pub type ExitFn = fn(&mut dyn AnimatedEntity);

/// Behaviour record for one animation state.
#[derive(Clone, Copy)]
pub struct AnimationState {
    id: AnimationStateId,
    enter: EnterFn,
    tick: TickFn,
    exit: ExitFn,
}

impl AnimationState {
    /// The standard behaviour: entering clears every state trigger and raises
    /// the state's own; ticking and exiting do nothing.
    #[must_use]
    pub fn standard(id: AnimationStateId) -> Self {
        Self {
            id,
            enter: enter_with_trigger,
            tick: |_, _| {},
            exit: |_| {},
        }
    }

    /// Replaces the enter behaviour.
    #[must_use]
    pub fn with_enter(mut self, enter: EnterFn) -> Self {
        self.enter = enter;
        self
    }

    /// Replaces the per-frame behaviour.
    #[must_use]
    pub fn with_tick(mut self, tick: TickFn) -> Self {
        self.tick = tick;
        self
    }

    /// Replaces the exit behaviour.
    #[must_use]
    pub fn with_exit(mut self, exit: ExitFn) -> Self {
        self.exit = exit;
        self
    }

    /// The state this record belongs to.
    #[must_use]
    pub fn id(&self) -> AnimationStateId {
        self.id
    }

    pub(crate) fn enter(&self, animator: &mut dyn AnimatedEntity) {
        (self.enter)(self.id, animator);
    }

    pub(crate) fn tick(&self, animator: &mut dyn AnimatedEntity, dt: f32) {
        (self.tick)(animator, dt);
    }

    pub(crate) fn exit(&self, animator: &mut dyn AnimatedEntity) {
        (self.exit)(animator);
    }
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationState").field("id", &self.id).finish()
    }
}

fn enter_with_trigger(id: AnimationStateId, animator: &mut dyn AnimatedEntity) {
    for state in AnimationStateId::ALL {
        animator.reset_trigger(state.trigger_name());
    }
    animator.set_trigger(id.trigger_name());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourguide_test_support::RecordingAnimator;

    #[test]
    fn test_standard_enter_resets_every_trigger_then_sets_its_own() {
        // Arrange
        let recorder = RecordingAnimator::new();
        let mut animator = recorder.clone();
        let state = AnimationState::standard(AnimationStateId::Pointing);

        // Act
        state.enter(&mut animator);

        // Assert
        for id in AnimationStateId::ALL {
            assert_eq!(recorder.reset_count(id.trigger_name()), 1);
        }
        assert_eq!(recorder.set_triggers(), vec!["Pointing".to_owned()]);
    }
}
