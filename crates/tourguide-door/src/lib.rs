//! Tourguide Door: lockable doors with a timed, eased open transition.

pub mod controller;
pub mod easing;

pub use controller::{DoorConfig, DoorController, DoorPhase};
pub use easing::Easing;
