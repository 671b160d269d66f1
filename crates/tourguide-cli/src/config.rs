//! Runner configuration read from the environment.

use std::path::PathBuf;

use crate::error::AppError;

/// Default tick rate in frames per second.
pub const DEFAULT_TICK_HZ: u16 = 60;

/// Default cap on simulated seconds.
pub const DEFAULT_MAX_SECONDS: f32 = 600.0;

/// How the headless runner should play a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Scene file to load (`TOUR_SCENE`).
    pub scene_path: PathBuf,
    /// Frames per second (`TICK_HZ`).
    pub tick_hz: u16,
    /// Simulated seconds after which the run gives up (`MAX_SECONDS`).
    pub max_seconds: f32,
    /// Pace ticks against the wall clock (`REALTIME`).
    pub realtime: bool,
}

impl RunConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `TOUR_SCENE` is unset or a value does
    /// not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `TOUR_SCENE` is missing or a value does
    /// not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let scene_path = lookup("TOUR_SCENE")
            .map(PathBuf::from)
            .ok_or_else(|| AppError::Config("TOUR_SCENE environment variable must be set".into()))?;

        let tick_hz = match lookup("TICK_HZ") {
            Some(value) => value
                .parse::<u16>()
                .ok()
                .filter(|hz| *hz > 0)
                .ok_or_else(|| {
                    AppError::Config(format!("TICK_HZ must be a positive integer, got {value:?}"))
                })?,
            None => DEFAULT_TICK_HZ,
        };

        let max_seconds = match lookup("MAX_SECONDS") {
            Some(value) => value
                .parse::<f32>()
                .ok()
                .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "MAX_SECONDS must be a positive finite number, got {value:?}"
                    ))
                })?,
            None => DEFAULT_MAX_SECONDS,
        };

        let realtime = match lookup("REALTIME") {
            Some(value) => value
                .parse::<bool>()
                .map_err(|e| AppError::Config(format!("REALTIME must be true or false: {e}")))?,
            None => false,
        };

        Ok(Self {
            scene_path,
            tick_hz,
            max_seconds,
            realtime,
        })
    }

    /// Seconds per frame.
    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / f32::from(self.tick_hz)
    }
}
