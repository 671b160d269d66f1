//! Tourguide Guide: the guide character.
//!
//! Composes a navigation agent, an audio player and the shared animation
//! state machine into character-level verbs, and raises an arrival
//! notification when a `go_to` completes.

pub mod agent;
pub mod hazard;

pub use agent::{GuideAgent, GuideConfig};
pub use hazard::HazardWarning;
