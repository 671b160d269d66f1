//! Error types for the headless runner.

use thiserror::Error;
use tourguide_core::error::StoryError;

/// Startup and runtime errors for the headless runner.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scene file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The scene file is not valid YAML for a scene.
    #[error("scene error: {0}")]
    Scene(#[from] serde_yaml::Error),

    /// The story could not be run.
    #[error("story error: {0}")]
    Story(#[from] StoryError),

    /// The run report could not be serialized.
    #[error("report error: {0}")]
    Report(#[from] serde_json::Error),
}
