//! Tourguide Animation: the guide's animation state machine.
//!
//! All state changes funnel through `AnimationStateMachine::change_state`,
//! which guarantees a single active state and an exit/swap/enter order.

pub mod machine;
pub mod state;

pub use machine::{AnimationStateMachine, Transition};
pub use state::{AnimationState, AnimationStateId};
