//! Shared helpers for headless runner integration tests.

use std::path::PathBuf;

use tourguide_cli::config::RunConfig;
use tourguide_cli::scene::SceneFile;

/// A run configuration that never sleeps.
pub fn config(tick_hz: u16, max_seconds: f32) -> RunConfig {
    RunConfig {
        scene_path: PathBuf::from("unused.yaml"),
        tick_hz,
        max_seconds,
        realtime: false,
    }
}

/// Parses a scene, panicking on malformed test data.
pub fn scene(yaml: &str) -> SceneFile {
    SceneFile::from_yaml(yaml).expect("test scene should parse")
}

/// Event type names of a report, in order.
pub fn event_types(report: &tourguide_cli::runner::RunReport) -> Vec<&'static str> {
    report
        .events
        .iter()
        .map(|event| event.kind.event_type())
        .collect()
}
