//! placecraft demo
//!
//! Usage:
//!   placecraft-demo                          # default configuration
//!   placecraft-demo --config placecraft.toml # explicit config file
//!   placecraft-demo --debug-visualization -v # wireframe patches, debug logs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use placecraft::EngineConfig;
use placecraft_demo::{run_demo, DemoOptions};

#[derive(Parser)]
#[command(name = "placecraft-demo", version, about = "Scripted placecraft interaction session")]
struct Cli {
    /// Configuration file (defaults to PLACECRAFT_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Draw surface patches as label-colored wireframes
    #[arg(long)]
    debug_visualization: bool,

    /// Samples per scripted gesture
    #[arg(long, default_value_t = 5)]
    steps: usize,

    /// Print gesture events as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    if cli.debug_visualization {
        config.debug.visualization = true;
    }
    if cli.verbose {
        config.debug.logging = true;
    }

    run_demo(DemoOptions {
        config,
        steps: cli.steps,
        json: cli.json,
    })
    .await
}
