//! Shared test doubles for the guided tour story engine.
//!
//! Each double is a cheap-to-clone handle over shared state, so a test can
//! hand one clone to the engine (boxed as a collaborator trait object) and
//! keep another to drive and inspect it.

mod animator;
mod audio;
mod navigation;

pub use animator::RecordingAnimator;
pub use audio::RecordingAudioPlayer;
pub use navigation::ScriptedNavigation;
