//! Story error types.

use thiserror::Error;

use crate::ids::DoorId;

/// Top-level error type for the story engine.
///
/// Every variant except `InvalidScript` is recoverable: the sequencer logs it
/// and skips past the offending step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// A collaborator (navigation, audio, animation, door, guide) is absent.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A step is missing a field it needs to run.
    #[error("step {step} is missing {field}")]
    MissingStepData {
        /// Index of the step in the script.
        step: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A state change was requested for an unregistered animation state.
    #[error("animation state not registered: {0}")]
    InvalidStateId(String),

    /// The operation is already underway or its result already holds.
    #[error("already in progress: {0}")]
    AlreadyInProgress(String),

    /// A door refused to open because it is locked.
    #[error("door {0} is locked")]
    DoorLocked(DoorId),

    /// The script has no steps.
    #[error("script has no steps")]
    EmptyScript,

    /// The script could not be loaded.
    #[error("invalid script: {0}")]
    InvalidScript(String),
}
