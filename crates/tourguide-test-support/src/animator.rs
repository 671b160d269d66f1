//! A recording `AnimatedEntity`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tourguide_core::collaborators::AnimatedEntity;

#[derive(Debug, Default)]
struct AnimatorState {
    set_triggers: Vec<String>,
    reset_triggers: Vec<String>,
    clip_lengths: HashMap<String, f32>,
    current_clip: Option<String>,
    normalized_time: f32,
    in_transition: bool,
}

/// An animated entity that records every trigger and plays back clips of
/// configurable length when the test advances it.
///
/// Setting a trigger starts the clip of the same name from normalized time
/// zero. Clips without a configured length last one second.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimator {
    state: Rc<RefCell<AnimatorState>>,
}

impl RecordingAnimator {
    /// Creates an animator with no clips configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the length of the clip started by `trigger`.
    #[must_use]
    pub fn with_clip_length(self, trigger: &str, seconds: f32) -> Self {
        self.state
            .borrow_mut()
            .clip_lengths
            .insert(trigger.to_owned(), seconds);
        self
    }

    /// Advances playback of the current clip by `dt` seconds.
    pub fn advance(&self, dt: f32) {
        let mut state = self.state.borrow_mut();
        let length = current_length(&state);
        state.normalized_time += dt / length;
    }

    /// Overrides the normalized time of the current clip.
    pub fn set_normalized_time(&self, normalized_time: f32) {
        self.state.borrow_mut().normalized_time = normalized_time;
    }

    /// Marks the entity as blending (or not) between clips.
    pub fn set_in_transition(&self, in_transition: bool) {
        self.state.borrow_mut().in_transition = in_transition;
    }

    /// Every trigger set so far, in order.
    #[must_use]
    pub fn set_triggers(&self) -> Vec<String> {
        self.state.borrow().set_triggers.clone()
    }

    /// How many times `name` was set.
    #[must_use]
    pub fn set_count(&self, name: &str) -> usize {
        self.state
            .borrow()
            .set_triggers
            .iter()
            .filter(|trigger| *trigger == name)
            .count()
    }

    /// How many times `name` was reset.
    #[must_use]
    pub fn reset_count(&self, name: &str) -> usize {
        self.state
            .borrow()
            .reset_triggers
            .iter()
            .filter(|trigger| *trigger == name)
            .count()
    }

    /// Name of the clip currently playing.
    #[must_use]
    pub fn current_clip(&self) -> Option<String> {
        self.state.borrow().current_clip.clone()
    }
}

fn current_length(state: &AnimatorState) -> f32 {
    state
        .current_clip
        .as_ref()
        .and_then(|clip| state.clip_lengths.get(clip))
        .copied()
        .filter(|length| *length > 0.0)
        .unwrap_or(1.0)
}

impl AnimatedEntity for RecordingAnimator {
    fn set_trigger(&mut self, name: &str) {
        let mut state = self.state.borrow_mut();
        state.set_triggers.push(name.to_owned());
        state.current_clip = Some(name.to_owned());
        state.normalized_time = 0.0;
    }

    fn reset_trigger(&mut self, name: &str) {
        self.state.borrow_mut().reset_triggers.push(name.to_owned());
    }

    fn normalized_time(&self) -> f32 {
        self.state.borrow().normalized_time
    }

    fn is_in_transition(&self) -> bool {
        self.state.borrow().in_transition
    }

    fn state_length(&self) -> f32 {
        current_length(&self.state.borrow())
    }
}
