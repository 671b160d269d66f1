//! Tourguide CLI: headless tour runner.
//!
//! Loads a scene file, wires the story engine to simulated navigation, audio
//! and animation, ticks it at a fixed rate and reports what happened.

pub mod config;
pub mod error;
pub mod runner;
pub mod scene;
pub mod sim;
