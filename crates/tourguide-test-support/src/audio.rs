//! A recording `AudioPlayer`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tourguide_core::collaborators::AudioPlayer;
use tourguide_core::ids::AudioClipRef;

#[derive(Debug, Default)]
struct AudioState {
    clip_lengths: HashMap<AudioClipRef, f32>,
    played: Vec<AudioClipRef>,
    playing: Option<AudioClipRef>,
    stop_calls: usize,
}

/// An audio player that records plays and reports configured clip lengths.
/// Unknown clips report a length of zero.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudioPlayer {
    state: Rc<RefCell<AudioState>>,
}

impl RecordingAudioPlayer {
    /// Creates a player with no clips configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the length of `clip`.
    #[must_use]
    pub fn with_clip(self, clip: &str, seconds: f32) -> Self {
        self.state
            .borrow_mut()
            .clip_lengths
            .insert(AudioClipRef::new(clip), seconds);
        self
    }

    /// Every clip played so far, in order.
    #[must_use]
    pub fn played(&self) -> Vec<AudioClipRef> {
        self.state.borrow().played.clone()
    }

    /// Number of `stop` calls.
    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.state.borrow().stop_calls
    }

    /// Marks the current clip as finished.
    pub fn finish_clip(&self) {
        self.state.borrow_mut().playing = None;
    }
}

impl AudioPlayer for RecordingAudioPlayer {
    fn play(&mut self, clip: &AudioClipRef) -> f32 {
        let mut state = self.state.borrow_mut();
        state.played.push(clip.clone());
        state.playing = Some(clip.clone());
        state.clip_lengths.get(clip).copied().unwrap_or(0.0)
    }

    fn stop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.stop_calls += 1;
        state.playing = None;
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing.is_some()
    }
}
