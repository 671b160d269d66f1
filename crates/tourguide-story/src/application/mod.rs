//! Running a script: the sequencer, its timers and the stage that hosts it.

pub mod progress;
pub mod sequencer;
pub mod stage;
pub mod timers;
