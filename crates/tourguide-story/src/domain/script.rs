//! The authored script.

use serde::{Deserialize, Serialize};
use tourguide_core::Position;
use tourguide_core::error::StoryError;

use super::step::Step;

/// A step together with its diagnostic label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    /// Human-readable name shown in logs.
    #[serde(default)]
    pub label: String,
    /// The action to run.
    #[serde(flatten)]
    pub step: Step,
}

impl ScriptEntry {
    /// Creates a labelled entry.
    #[must_use]
    pub fn new(label: impl Into<String>, step: Step) -> Self {
        Self {
            label: label.into(),
            step,
        }
    }
}

/// An ordered, immutable list of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    entries: Vec<ScriptEntry>,
}

impl Script {
    /// Creates a script from labelled entries.
    #[must_use]
    pub fn new(entries: Vec<ScriptEntry>) -> Self {
        Self { entries }
    }

    /// Creates a script from bare steps, labelling each by position and tag.
    #[must_use]
    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        let entries = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                ScriptEntry::new(format!("{index}: {}", step.action_name()), step)
            })
            .collect();
        Self { entries }
    }

    /// Parses a YAML list of entries.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::InvalidScript` if the YAML does not describe a
    /// list of steps.
    pub fn from_yaml(yaml: &str) -> Result<Self, StoryError> {
        serde_yaml::from_str(yaml).map_err(|e| StoryError::InvalidScript(e.to_string()))
    }

    /// Builds a waypoint tour: walk to each waypoint in turn and linger there
    /// for `dwell` seconds.
    #[must_use]
    pub fn waypoint_tour(waypoints: &[Position], dwell: f32) -> Self {
        let entries = waypoints
            .iter()
            .enumerate()
            .flat_map(|(index, waypoint)| {
                [
                    ScriptEntry::new(format!("waypoint {index}"), Step::move_to(*waypoint)),
                    ScriptEntry::new(format!("linger at waypoint {index}"), Step::wait(dwell)),
                ]
            })
            .collect();
        Self { entries }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScriptEntry> {
        self.entries.get(index)
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }
}
