//! Scene files: everything a headless run needs, in YAML.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tourguide_animation::AnimationStateId;
use tourguide_core::Position;
use tourguide_core::ids::{AudioClipRef, DoorId};
use tourguide_door::DoorConfig;
use tourguide_guide::GuideConfig;
use tourguide_guide::hazard::DEFAULT_WARNING_COOLDOWN;
use tourguide_story::application::stage::StoryConfig;
use tourguide_story::domain::script::Script;
use tracing::debug;

use crate::error::AppError;

fn default_cooldown() -> f32 {
    DEFAULT_WARNING_COOLDOWN
}

/// A door placed in the scene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DoorSpec {
    /// Identifier steps refer to.
    pub id: DoorId,
    /// Angles, timing and initial state.
    #[serde(flatten)]
    pub config: DoorConfig,
}

/// A hazard zone and the times the simulated visitor walks into it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HazardSpec {
    /// Warning clip.
    pub clip: AudioClipRef,
    /// Seconds before the zone can warn again.
    #[serde(default = "default_cooldown")]
    pub cooldown: f32,
    /// Run times, in seconds, at which the visitor enters the zone.
    #[serde(default)]
    pub visitor_enters_at: Vec<f32>,
}

/// A scene: the guide, the props, the visitor and the script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Story settings.
    pub story: StoryConfig,
    /// Guide tuning.
    pub guide: GuideConfig,
    /// Where the guide starts.
    pub guide_start: Position,
    /// Where the visitor stands, if anywhere.
    pub visitor: Option<Position>,
    /// Voice clip lengths in seconds, by clip name.
    pub clips: HashMap<String, f32>,
    /// Animation clip lengths in seconds, by state.
    pub animation_lengths: HashMap<AnimationStateId, f32>,
    /// Doors.
    pub doors: Vec<DoorSpec>,
    /// Hazard zones.
    pub hazards: Vec<HazardSpec>,
    /// The script.
    pub steps: Script,
}

impl SceneFile {
    /// Parses a scene from YAML.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Scene` if the YAML does not describe a scene.
    pub fn from_yaml(yaml: &str) -> Result<Self, AppError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses the scene at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read and
    /// `AppError::Scene` if it does not parse.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        debug!(path = %path.display(), "loading scene");
        let yaml = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&yaml)
    }
}
