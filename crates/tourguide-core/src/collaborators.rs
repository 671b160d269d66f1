//! Traits for the engine-side collaborators the story engine drives.
//!
//! Implementations live in the host (a game engine, the headless simulator in
//! `tourguide-cli`, or the doubles in `tourguide-test-support`).

use glam::Vec3;

use crate::Position;
use crate::ids::AudioClipRef;

/// An agent that walks an entity along a navigation mesh.
pub trait NavigationAgent {
    /// Starts pathing towards `destination`.
    fn set_destination(&mut self, destination: Position);

    /// Halts movement, keeping the current path.
    fn stop(&mut self);

    /// Resumes movement after `stop`.
    fn resume(&mut self);

    /// Sets the movement speed in units per second.
    fn set_speed(&mut self, speed: f32);

    /// Orients the entity towards `target`.
    fn look_at(&mut self, target: Position);

    /// Current world position of the entity.
    fn position(&self) -> Position;

    /// Whether a path is still being computed.
    fn path_pending(&self) -> bool;

    /// Distance left along the current path.
    fn remaining_distance(&self) -> f32;

    /// Distance from the destination at which the agent stops.
    fn stopping_distance(&self) -> f32;

    /// Current velocity.
    fn velocity(&self) -> Vec3;

    /// Whether the agent currently holds a path.
    fn has_path(&self) -> bool;
}

/// Plays voice clips.
pub trait AudioPlayer {
    /// Plays `clip` from the start and returns its length in seconds.
    fn play(&mut self, clip: &AudioClipRef) -> f32;

    /// Stops the current clip, if any.
    fn stop(&mut self);

    /// Whether a clip is playing.
    fn is_playing(&self) -> bool;
}

/// The animated body of the guide, driven by named triggers.
pub trait AnimatedEntity {
    /// Raises the trigger `name`.
    fn set_trigger(&mut self, name: &str);

    /// Clears a pending trigger `name`.
    fn reset_trigger(&mut self, name: &str);

    /// Normalized playback time of the current clip; `1.0` marks the end of
    /// the first loop.
    fn normalized_time(&self) -> f32;

    /// Whether the entity is blending between two clips.
    fn is_in_transition(&self) -> bool;

    /// Length in seconds of the current clip.
    fn state_length(&self) -> f32;
}
