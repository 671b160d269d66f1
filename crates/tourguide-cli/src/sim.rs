//! Simulated collaborators for headless runs.
//!
//! Each type is a cheap `Clone` handle over shared state: one clone is handed
//! to the engine, the runner keeps another and advances it once per frame
//! before the stage ticks.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;
use tourguide_core::Position;
use tourguide_core::collaborators::{AnimatedEntity, AudioPlayer, NavigationAgent};
use tourguide_core::ids::AudioClipRef;
use tracing::warn;

/// Seconds a simulated animator spends blending into a new clip.
pub const BLEND_SECONDS: f32 = 0.1;

/// Length of an animation clip without a configured length.
pub const DEFAULT_CLIP_SECONDS: f32 = 1.0;

#[derive(Debug, Default)]
struct Walker {
    position: Position,
    facing: Option<Position>,
    destination: Option<Position>,
    speed: f32,
    stopped: bool,
    velocity: Vec3,
}

/// Straight-line navigation with no obstacles.
#[derive(Debug, Clone, Default)]
pub struct SimulatedNavigation {
    state: Rc<RefCell<Walker>>,
}

impl SimulatedNavigation {
    /// Creates an agent standing at `position`.
    #[must_use]
    pub fn at(position: Position) -> Self {
        let navigation = Self::default();
        navigation.state.borrow_mut().position = position;
        navigation
    }

    /// Moves towards the destination for `dt` seconds, snapping onto it when
    /// it is within one frame's reach.
    pub fn advance(&self, dt: f32) {
        let mut walker = self.state.borrow_mut();
        let Some(destination) = walker.destination else {
            walker.velocity = Vec3::ZERO;
            return;
        };
        if walker.stopped {
            walker.velocity = Vec3::ZERO;
            return;
        }

        let offset = destination - walker.position;
        let step = walker.speed * dt;
        if offset.length() <= step {
            walker.position = destination;
            walker.destination = None;
            walker.velocity = Vec3::ZERO;
        } else {
            let velocity = offset.normalize_or_zero() * walker.speed;
            walker.position += velocity * dt;
            walker.velocity = velocity;
        }
    }

    /// Where the agent was last told to look.
    #[must_use]
    pub fn facing(&self) -> Option<Position> {
        self.state.borrow().facing
    }
}

impl NavigationAgent for SimulatedNavigation {
    fn set_destination(&mut self, destination: Position) {
        self.state.borrow_mut().destination = Some(destination);
    }

    fn stop(&mut self) {
        let mut walker = self.state.borrow_mut();
        walker.stopped = true;
        walker.velocity = Vec3::ZERO;
    }

    fn resume(&mut self) {
        self.state.borrow_mut().stopped = false;
    }

    fn set_speed(&mut self, speed: f32) {
        self.state.borrow_mut().speed = speed.max(0.0);
    }

    fn look_at(&mut self, target: Position) {
        self.state.borrow_mut().facing = Some(target);
    }

    fn position(&self) -> Position {
        self.state.borrow().position
    }

    fn path_pending(&self) -> bool {
        false
    }

    fn remaining_distance(&self) -> f32 {
        let walker = self.state.borrow();
        walker
            .destination
            .map_or(0.0, |destination| walker.position.distance(destination))
    }

    fn stopping_distance(&self) -> f32 {
        0.0
    }

    fn velocity(&self) -> Vec3 {
        self.state.borrow().velocity
    }

    fn has_path(&self) -> bool {
        self.state.borrow().destination.is_some()
    }
}

#[derive(Debug, Default)]
struct Speaker {
    lengths: HashMap<String, f32>,
    playing: Option<f32>,
}

/// Audio that plays silent clips of configured length.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAudio {
    state: Rc<RefCell<Speaker>>,
}

impl SimulatedAudio {
    /// Creates a player that knows the given clip lengths.
    #[must_use]
    pub fn new(lengths: HashMap<String, f32>) -> Self {
        Self {
            state: Rc::new(RefCell::new(Speaker {
                lengths,
                playing: None,
            })),
        }
    }

    /// Plays the current clip for `dt` seconds.
    pub fn advance(&self, dt: f32) {
        let mut speaker = self.state.borrow_mut();
        if let Some(remaining) = speaker.playing.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                speaker.playing = None;
            }
        }
    }
}

impl AudioPlayer for SimulatedAudio {
    fn play(&mut self, clip: &AudioClipRef) -> f32 {
        let mut speaker = self.state.borrow_mut();
        let Some(length) = speaker.lengths.get(clip.name()).copied() else {
            warn!(%clip, "unknown audio clip, playing nothing");
            speaker.playing = None;
            return 0.0;
        };
        speaker.playing = Some(length);
        length
    }

    fn stop(&mut self) {
        self.state.borrow_mut().playing = None;
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing.is_some()
    }
}

#[derive(Debug, Default)]
struct Body {
    lengths: HashMap<String, f32>,
    clip: Option<String>,
    normalized_time: f32,
    blend_remaining: f32,
}

impl Body {
    fn clip_length(&self) -> f32 {
        self.clip
            .as_ref()
            .and_then(|clip| self.lengths.get(clip))
            .copied()
            .filter(|length| *length > 0.0)
            .unwrap_or(DEFAULT_CLIP_SECONDS)
    }
}

/// Animated body that plays one clip per trigger and blends into it.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAnimator {
    state: Rc<RefCell<Body>>,
}

impl SimulatedAnimator {
    /// Creates an animator with clip lengths keyed by trigger name.
    #[must_use]
    pub fn new(lengths: HashMap<String, f32>) -> Self {
        Self {
            state: Rc::new(RefCell::new(Body {
                lengths,
                ..Body::default()
            })),
        }
    }

    /// Plays the current clip for `dt` seconds.
    pub fn advance(&self, dt: f32) {
        let mut body = self.state.borrow_mut();
        body.blend_remaining = (body.blend_remaining - dt).max(0.0);
        let length = body.clip_length();
        body.normalized_time += dt / length;
    }

    /// Name of the clip playing.
    #[must_use]
    pub fn clip(&self) -> Option<String> {
        self.state.borrow().clip.clone()
    }
}

impl AnimatedEntity for SimulatedAnimator {
    fn set_trigger(&mut self, name: &str) {
        let mut body = self.state.borrow_mut();
        body.clip = Some(name.to_owned());
        body.normalized_time = 0.0;
        body.blend_remaining = BLEND_SECONDS;
    }

    fn reset_trigger(&mut self, _name: &str) {}

    fn normalized_time(&self) -> f32 {
        self.state.borrow().normalized_time
    }

    fn is_in_transition(&self) -> bool {
        self.state.borrow().blend_remaining > 0.0
    }

    fn state_length(&self) -> f32 {
        self.state.borrow().clip_length()
    }
}
