//! Tour guide headless runner entry point.

use std::error::Error;

use tourguide_cli::config::RunConfig;
use tourguide_cli::runner::run_headless;
use tourguide_cli::scene::SceneFile;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so the report on stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting tour guide headless runner");

    let config = RunConfig::from_env()?;
    let scene = SceneFile::load(&config.scene_path).await?;
    let report = run_headless(&scene, &config).await?;

    println!("{}", report.to_json()?);
    Ok(())
}
