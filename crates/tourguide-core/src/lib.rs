//! Tourguide Core: shared abstractions.
//!
//! This crate defines the error taxonomy, identifiers, collaborator traits and
//! notification plumbing that the animation, door, guide and story crates all
//! depend on. It contains no engine code.

pub mod clock;
pub mod collaborators;
pub mod error;
pub mod ids;
pub mod signal;

/// World-space position.
pub type Position = glam::Vec3;
