//! The animation state machine.

use std::collections::HashMap;
use std::fmt;

use tourguide_core::collaborators::AnimatedEntity;
use tourguide_core::error::StoryError;
use tracing::{debug, warn};

use crate::state::{AnimationState, AnimationStateId};

/// Outcome of a successful `change_state` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The requested state was already active; nothing ran.
    Unchanged,
    /// The previous state exited and the new one entered.
    Changed {
        /// State that was active before, if any.
        from: Option<AnimationStateId>,
        /// State that is active now.
        to: AnimationStateId,
    },
}

/// Owns the registered animation states and the single active one.
pub struct AnimationStateMachine {
    animator: Box<dyn AnimatedEntity>,
    registry: HashMap<AnimationStateId, AnimationState>,
    current: Option<AnimationStateId>,
}

impl AnimationStateMachine {
    /// Creates a machine with no registered states and nothing active.
    #[must_use]
    pub fn new(animator: Box<dyn AnimatedEntity>) -> Self {
        Self {
            animator,
            registry: HashMap::new(),
            current: None,
        }
    }

    /// Creates a machine with every standard state registered and `Idle`
    /// entered.
    #[must_use]
    pub fn with_standard_states(animator: Box<dyn AnimatedEntity>) -> Self {
        let mut machine = Self::new(animator);
        for id in AnimationStateId::ALL {
            machine.register_state(AnimationState::standard(id));
        }
        machine.enter_initial(AnimationStateId::Idle);
        machine
    }

    fn enter_initial(&mut self, id: AnimationStateId) {
        if let Some(state) = self.registry.get(&id) {
            state.enter(self.animator.as_mut());
            self.current = Some(id);
        }
    }

    /// Registers `state`, replacing any earlier registration for the same id.
    /// Returns the replaced record.
    pub fn register_state(&mut self, state: AnimationState) -> Option<AnimationState> {
        let previous = self.registry.insert(state.id(), state);
        if previous.is_some() {
            warn!(state = %state.id(), "overriding registered animation state");
        }
        previous
    }

    /// Makes `id` the active state.
    ///
    /// Requesting the state that is already active does nothing. Otherwise the
    /// previous state exits before the new one enters.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::InvalidStateId` if `id` is not registered; the
    /// active state is left untouched.
    pub fn change_state(&mut self, id: AnimationStateId) -> Result<Transition, StoryError> {
        if self.current == Some(id) {
            return Ok(Transition::Unchanged);
        }

        let Some(next) = self.registry.get(&id).copied() else {
            warn!(state = %id, "animation state not registered");
            return Err(StoryError::InvalidStateId(id.to_string()));
        };

        let from = self.current;
        if let Some(previous) = from.and_then(|current| self.registry.get(&current)) {
            previous.exit(self.animator.as_mut());
        }
        self.current = Some(id);
        next.enter(self.animator.as_mut());

        debug!(from = ?from, to = %id, "animation state changed");
        Ok(Transition::Changed { from, to: id })
    }

    /// Forwards the frame to the active state.
    pub fn tick(&mut self, dt: f32) {
        if let Some(state) = self.current.and_then(|id| self.registry.get(&id)) {
            state.tick(self.animator.as_mut(), dt);
        }
    }

    /// The active state, if any.
    #[must_use]
    pub fn current_state_id(&self) -> Option<AnimationStateId> {
        self.current
    }

    /// Read access to the animated entity.
    #[must_use]
    pub fn animator(&self) -> &dyn AnimatedEntity {
        self.animator.as_ref()
    }

    /// Whether the current clip has played through once and is not blending.
    #[must_use]
    pub fn clip_finished(&self) -> bool {
        self.animator.normalized_time() >= 1.0 && !self.animator.is_in_transition()
    }
}

impl fmt::Debug for AnimationStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationStateMachine")
            .field("registered", &self.registry.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourguide_test_support::RecordingAnimator;

    fn counting_state(id: AnimationStateId) -> AnimationState {
        AnimationState::standard(id).with_exit(|animator| animator.reset_trigger("exited"))
    }

    fn machine_with_counting_states(recorder: &RecordingAnimator) -> AnimationStateMachine {
        let mut machine = AnimationStateMachine::new(Box::new(recorder.clone()));
        for id in AnimationStateId::ALL {
            machine.register_state(counting_state(id));
        }
        machine
    }

    #[test]
    fn test_with_standard_states_starts_in_idle() {
        // Arrange
        let recorder = RecordingAnimator::new();

        // Act
        let machine = AnimationStateMachine::with_standard_states(Box::new(recorder.clone()));

        // Assert
        assert_eq!(machine.current_state_id(), Some(AnimationStateId::Idle));
        assert_eq!(recorder.set_triggers(), vec!["Idle".to_owned()]);
    }

    #[test]
    fn test_change_state_to_current_state_enters_only_once() {
        // Arrange
        let recorder = RecordingAnimator::new();
        let mut machine = machine_with_counting_states(&recorder);

        // Act
        let first = machine.change_state(AnimationStateId::Victory);
        let second = machine.change_state(AnimationStateId::Victory);

        // Assert
        assert_eq!(
            first,
            Ok(Transition::Changed {
                from: None,
                to: AnimationStateId::Victory
            })
        );
        assert_eq!(second, Ok(Transition::Unchanged));
        assert_eq!(recorder.set_count("Victory"), 1);
        assert_eq!(recorder.reset_count("exited"), 0);
    }

    #[test]
    fn test_change_state_exits_previous_before_entering_next() {
        // Arrange
        let recorder = RecordingAnimator::new();
        let mut machine = machine_with_counting_states(&recorder);
        machine.change_state(AnimationStateId::Walking).unwrap();

        // Act
        let result = machine.change_state(AnimationStateId::Talking);

        // Assert
        assert_eq!(
            result,
            Ok(Transition::Changed {
                from: Some(AnimationStateId::Walking),
                to: AnimationStateId::Talking
            })
        );
        assert_eq!(recorder.reset_count("exited"), 1);
        assert_eq!(recorder.current_clip().as_deref(), Some("Talking"));
    }

    #[test]
    fn test_change_state_to_unregistered_state_keeps_current() {
        // Arrange
        let recorder = RecordingAnimator::new();
        let mut machine = AnimationStateMachine::new(Box::new(recorder.clone()));
        machine.register_state(AnimationState::standard(AnimationStateId::Idle));
        machine.change_state(AnimationStateId::Idle).unwrap();

        // Act
        let result = machine.change_state(AnimationStateId::Rejected);

        // Assert
        assert_eq!(
            result,
            Err(StoryError::InvalidStateId("Rejected".to_owned()))
        );
        assert_eq!(machine.current_state_id(), Some(AnimationStateId::Idle));
        assert_eq!(recorder.set_count("Rejected"), 0);
    }

    #[test]
    fn test_register_state_keeps_latest_registration() {
        // Arrange
        let recorder = RecordingAnimator::new();
        let mut machine = AnimationStateMachine::new(Box::new(recorder.clone()));
        machine.register_state(AnimationState::standard(AnimationStateId::Pointing));

        // Act
        let replaced = machine.register_state(
            AnimationState::standard(AnimationStateId::Pointing)
                .with_enter(|_, animator| animator.set_trigger("PointLeft")),
        );
        machine.change_state(AnimationStateId::Pointing).unwrap();

        // Assert
        assert!(replaced.is_some());
        assert_eq!(recorder.set_triggers(), vec!["PointLeft".to_owned()]);
    }

    #[test]
    fn test_tick_reaches_only_the_active_state() {
        // Arrange
        let recorder = RecordingAnimator::new();
        let mut machine = AnimationStateMachine::new(Box::new(recorder.clone()));
        machine.register_state(
            AnimationState::standard(AnimationStateId::Walking)
                .with_tick(|animator, _| animator.reset_trigger("walking-tick")),
        );
        machine.register_state(
            AnimationState::standard(AnimationStateId::Idle)
                .with_tick(|animator, _| animator.reset_trigger("idle-tick")),
        );
        machine.change_state(AnimationStateId::Walking).unwrap();

        // Act
        machine.tick(0.016);
        machine.tick(0.016);

        // Assert
        assert_eq!(recorder.reset_count("walking-tick"), 2);
        assert_eq!(recorder.reset_count("idle-tick"), 0);
    }

    #[test]
    fn test_clip_finished_requires_full_playback_outside_transition() {
        // Arrange
        let recorder = RecordingAnimator::new().with_clip_length("Victory", 2.0);
        let mut machine = AnimationStateMachine::with_standard_states(Box::new(recorder.clone()));
        machine.change_state(AnimationStateId::Victory).unwrap();

        // Act / Assert
        recorder.advance(1.5);
        assert!(!machine.clip_finished());

        recorder.advance(0.5);
        recorder.set_in_transition(true);
        assert!(!machine.clip_finished());

        recorder.set_in_transition(false);
        assert!(machine.clip_finished());
    }
}
