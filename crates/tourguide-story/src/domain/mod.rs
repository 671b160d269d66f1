//! Authored script data and the sequencer's bookkeeping types.

pub mod cursor;
pub mod events;
pub mod script;
pub mod step;
