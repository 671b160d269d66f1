//! Script steps.

use serde::{Deserialize, Serialize};
use tourguide_animation::AnimationStateId;
use tourguide_core::Position;
use tourguide_core::ids::{AudioClipRef, DoorId};

/// Extra seconds a talk step waits after its clip, unless authored otherwise.
pub const DEFAULT_TALK_EXTRA_WAIT: f32 = 0.5;

fn default_talk_extra_wait() -> f32 {
    DEFAULT_TALK_EXTRA_WAIT
}

/// One scripted action with a single completion condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Walk to `destination`; completes on arrival.
    MoveTo {
        /// Where to walk. `None` when the authored reference is unset.
        #[serde(default)]
        destination: Option<Position>,
    },
    /// Speak `clip`; completes after the clip plus `extra_wait`.
    Talk {
        /// Clip to play. `None` when the authored reference is unset.
        #[serde(default)]
        clip: Option<AudioClipRef>,
        /// Seconds to hold after the clip ends.
        #[serde(default = "default_talk_extra_wait")]
        extra_wait: f32,
    },
    /// Do nothing for `duration` seconds.
    Wait {
        /// Seconds to wait.
        duration: f32,
    },
    /// Switch the guide to `state`; completes after `duration` seconds, or
    /// when the clip finishes if `duration` is zero.
    PlayAnimation {
        /// State to enter.
        state: AnimationStateId,
        /// Seconds to hold, or `0` to wait for the clip.
        #[serde(default)]
        duration: f32,
    },
    /// Open `door`; completes when it opens or refuses to.
    DoorOpen {
        /// Door to open. `None` when the authored reference is unset.
        #[serde(default)]
        door: Option<DoorId>,
        /// Unlock the door before trying it.
        #[serde(default)]
        unlock_first: bool,
    },
}

impl Step {
    /// A `MoveTo` step.
    #[must_use]
    pub fn move_to(destination: Position) -> Self {
        Self::MoveTo {
            destination: Some(destination),
        }
    }

    /// A `Talk` step.
    #[must_use]
    pub fn talk(clip: impl Into<AudioClipRef>, extra_wait: f32) -> Self {
        Self::Talk {
            clip: Some(clip.into()),
            extra_wait,
        }
    }

    /// A `Wait` step.
    #[must_use]
    pub fn wait(duration: f32) -> Self {
        Self::Wait { duration }
    }

    /// A `PlayAnimation` step.
    #[must_use]
    pub fn play_animation(state: AnimationStateId, duration: f32) -> Self {
        Self::PlayAnimation { state, duration }
    }

    /// A `DoorOpen` step.
    #[must_use]
    pub fn open_door(door: impl Into<DoorId>, unlock_first: bool) -> Self {
        Self::DoorOpen {
            door: Some(door.into()),
            unlock_first,
        }
    }

    /// The authoring tag of this step.
    #[must_use]
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::MoveTo { .. } => "move_to",
            Self::Talk { .. } => "talk",
            Self::Wait { .. } => "wait",
            Self::PlayAnimation { .. } => "play_animation",
            Self::DoorOpen { .. } => "door_open",
        }
    }
}
