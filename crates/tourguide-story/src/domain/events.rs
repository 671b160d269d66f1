//! Story events recorded by the sequencer.

use serde::Serialize;

/// Something that happened while running a story.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryEvent {
    /// Sequencer frame on which it happened.
    pub frame: u64,
    /// Seconds since the sequencer was created.
    pub elapsed: f32,
    /// What happened.
    #[serde(flatten)]
    pub kind: StoryEventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoryEventKind {
    /// The story began from its first step.
    StoryStarted {
        /// Number of steps in the script.
        steps: usize,
    },
    /// A step was dispatched.
    StepStarted {
        /// Step index.
        index: usize,
        /// Step label.
        label: String,
        /// Step tag.
        action: &'static str,
    },
    /// A step could not run and was passed over.
    StepSkipped {
        /// Step index.
        index: usize,
        /// Why it was skipped.
        reason: String,
    },
    /// A step's completion condition fired.
    StepCompleted {
        /// Step index.
        index: usize,
    },
    /// A completion arrived for a wait that is no longer active.
    StaleCompletionIgnored {
        /// Generation of the stale token.
        token: u64,
    },
    /// The last step completed.
    StoryFinished {
        /// Number of steps in the script.
        steps: usize,
    },
    /// The story was stopped before it finished.
    StoryStopped {
        /// Step that was current when it stopped.
        index: Option<usize>,
    },
}

impl StoryEventKind {
    /// Dotted type name used in logs and reports.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StoryStarted { .. } => "story.started",
            Self::StepStarted { .. } => "story.step_started",
            Self::StepSkipped { .. } => "story.step_skipped",
            Self::StepCompleted { .. } => "story.step_completed",
            Self::StaleCompletionIgnored { .. } => "story.stale_completion_ignored",
            Self::StoryFinished { .. } => "story.finished",
            Self::StoryStopped { .. } => "story.stopped",
        }
    }
}
