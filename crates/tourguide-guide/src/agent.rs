//! The guide agent.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tourguide_animation::{AnimationStateId, AnimationStateMachine};
use tourguide_core::Position;
use tourguide_core::collaborators::{AudioPlayer, NavigationAgent};
use tourguide_core::error::StoryError;
use tourguide_core::ids::AudioClipRef;
use tourguide_core::signal::Signal;
use tracing::{debug, error, info, warn};

/// Movement tuning for the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Walking speed in units per second.
    pub walk_speed: f32,
    /// Slack added to the agent's stopping distance when detecting arrival.
    pub arrival_tolerance: f32,
    /// Squared speed below which the agent counts as standing still.
    pub rest_velocity_sq: f32,
    /// When set, the guide halts while the visitor is farther away than this.
    pub wait_distance: Option<f32>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            walk_speed: 1.5,
            arrival_tolerance: 0.05,
            rest_velocity_sq: 0.001,
            wait_distance: None,
        }
    }
}

/// The tour guide character.
pub struct GuideAgent {
    config: GuideConfig,
    animation: Rc<RefCell<AnimationStateMachine>>,
    navigation: Option<Box<dyn NavigationAgent>>,
    audio: Option<Box<dyn AudioPlayer>>,
    focus: Option<Position>,
    destination: Option<Position>,
    moving: bool,
    waiting: bool,
    arrival_sent: bool,
    destination_reached: Signal<()>,
}

impl GuideAgent {
    /// Creates a guide that drives `animation`. Navigation and audio are
    /// attached separately; verbs that need them fail softly until they are.
    #[must_use]
    pub fn new(config: GuideConfig, animation: Rc<RefCell<AnimationStateMachine>>) -> Self {
        Self {
            config,
            animation,
            navigation: None,
            audio: None,
            focus: None,
            destination: None,
            moving: false,
            waiting: false,
            arrival_sent: false,
            destination_reached: Signal::new(),
        }
    }

    /// Attaches the navigation agent.
    #[must_use]
    pub fn with_navigation(mut self, mut navigation: Box<dyn NavigationAgent>) -> Self {
        navigation.set_speed(self.config.walk_speed);
        self.navigation = Some(navigation);
        self
    }

    /// Attaches the audio player.
    #[must_use]
    pub fn with_audio(mut self, audio: Box<dyn AudioPlayer>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Sets the tracked target the guide turns to face, usually the visitor.
    pub fn set_focus(&mut self, focus: Option<Position>) {
        self.focus = focus;
    }

    /// Walks towards `destination`.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::MissingCollaborator` if no navigation agent is
    /// attached; nothing else changes in that case.
    pub fn go_to(&mut self, destination: Position) -> Result<(), StoryError> {
        let Some(navigation) = self.navigation.as_mut() else {
            error!("guide has no navigation agent");
            return Err(StoryError::MissingCollaborator("navigation agent"));
        };

        info!(?destination, "guide walking");
        navigation.resume();
        navigation.set_speed(self.config.walk_speed);
        navigation.set_destination(destination);

        self.destination = Some(destination);
        self.arrival_sent = false;
        self.moving = true;
        self.waiting = false;
        self.play(AnimationStateId::Walking);
        Ok(())
    }

    /// Plays `clip`, halting and turning to the visitor. Returns the clip
    /// length in seconds.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::MissingCollaborator` if no audio player is
    /// attached; nothing else changes in that case.
    pub fn speak(&mut self, clip: &AudioClipRef) -> Result<f32, StoryError> {
        let Some(audio) = self.audio.as_mut() else {
            warn!(%clip, "guide has no audio player");
            return Err(StoryError::MissingCollaborator("audio player"));
        };

        if audio.is_playing() {
            audio.stop();
        }
        let duration = audio.play(clip);

        if let Some(navigation) = self.navigation.as_mut() {
            navigation.stop();
        }
        self.moving = false;
        self.waiting = false;

        self.face_focus();
        self.play(AnimationStateId::Talking);
        info!(%clip, duration, "guide speaking");
        Ok(duration)
    }

    /// Switches to the idle animation.
    pub fn idle(&mut self) {
        self.play(AnimationStateId::Idle);
    }

    /// Abandons any walk in progress and goes idle. No arrival is reported
    /// for the abandoned walk.
    pub fn halt(&mut self) {
        if let Some(navigation) = self.navigation.as_mut() {
            navigation.stop();
        }
        if self.moving {
            debug!(destination = ?self.destination, "guide halted");
        }
        self.destination = None;
        self.moving = false;
        self.waiting = false;
        self.play(AnimationStateId::Idle);
    }

    /// Runs arrival detection and visitor following for one frame.
    pub fn tick(&mut self, _dt: f32) {
        if !self.moving || self.arrival_sent {
            return;
        }
        let Some(navigation) = self.navigation.as_deref() else {
            return;
        };

        if self.has_arrived(navigation) {
            self.arrive();
        } else {
            self.follow_visitor();
        }
    }

    fn has_arrived(&self, navigation: &dyn NavigationAgent) -> bool {
        if navigation.path_pending() {
            return false;
        }
        let within_reach = navigation.remaining_distance()
            <= navigation.stopping_distance() + self.config.arrival_tolerance;
        let at_rest = !navigation.has_path()
            || navigation.velocity().length_squared() < self.config.rest_velocity_sq;
        within_reach && at_rest
    }

    fn arrive(&mut self) {
        self.arrival_sent = true;
        self.moving = false;
        self.waiting = false;
        self.destination = None;
        if let Some(navigation) = self.navigation.as_mut() {
            navigation.stop();
        }

        self.play(AnimationStateId::Idle);
        self.face_focus();
        info!("guide reached destination");
        self.destination_reached.emit(&());
    }

    fn follow_visitor(&mut self) {
        let (Some(limit), Some(focus)) = (self.config.wait_distance, self.focus) else {
            return;
        };
        let Some(navigation) = self.navigation.as_mut() else {
            return;
        };

        let distance = navigation.position().distance(focus);
        if distance > limit && !self.waiting {
            self.waiting = true;
            navigation.stop();
            self.play(AnimationStateId::Idle);
            self.face_focus();
            debug!(distance, "guide waiting for visitor");
        } else if distance <= limit && self.waiting {
            self.waiting = false;
            navigation.resume();
            self.play(AnimationStateId::Walking);
            debug!(distance, "visitor caught up, guide walking on");
        }
    }

    fn face_focus(&mut self) {
        let (Some(focus), Some(navigation)) = (self.focus, self.navigation.as_mut()) else {
            return;
        };
        let position = navigation.position();
        navigation.look_at(Vec3::new(focus.x, position.y, focus.z));
    }

    fn play(&self, state: AnimationStateId) {
        if let Err(error) = self.animation.borrow_mut().change_state(state) {
            debug!(%error, "guide animation change ignored");
        }
    }

    /// Destination of a `go_to` that has not arrived yet, including one
    /// interrupted by `speak`.
    #[must_use]
    pub fn pending_destination(&self) -> Option<Position> {
        if self.arrival_sent {
            None
        } else {
            self.destination
        }
    }

    /// Whether a `go_to` is being followed.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Whether the guide is halted waiting for the visitor.
    #[must_use]
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Fires once per completed `go_to`.
    pub fn on_destination_reached(&mut self) -> &mut Signal<()> {
        &mut self.destination_reached
    }
}

impl fmt::Debug for GuideAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuideAgent")
            .field("config", &self.config)
            .field("has_navigation", &self.navigation.is_some())
            .field("has_audio", &self.audio.is_some())
            .field("focus", &self.focus)
            .field("moving", &self.moving)
            .field("waiting", &self.waiting)
            .finish_non_exhaustive()
    }
}
