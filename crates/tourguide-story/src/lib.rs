//! Tourguide Story: story orchestration.
//!
//! Responsible for the authored script, the step sequencer that walks it one
//! step at a time, and the stage that ticks the guide, doors and sequencer
//! in a fixed order every frame.

pub mod application;
pub mod domain;
