//! # Brawl Engine
//!
//! Headless match runner for Project Brawl.
//!
//! Loads the engine config, roster and stage, plays the configured rounds
//! of player against boss and prints a JSON match summary on stdout.
//!
//! Usage: `brawl [CONFIG] [--init]`. `CONFIG` defaults to `brawl.toml`;
//! `--init` writes a default config there and exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod runner;
mod stage;
mod timing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE};
use crate::runner::MatchRunner;

/// Main entry point.
fn main() -> Result<()> {
    let mut config_path = PathBuf::from(CONFIG_FILE);
    let mut init = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--init" => init = true,
            _ => config_path = PathBuf::from(arg),
        }
    }

    // Read before logging is up so the config can choose the log format
    let read = EngineConfig::read(&config_path);
    let log_json = read.as_ref().is_ok_and(|c| c.log_json);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(log_json.then(|| fmt::layer().json()))
        .with((!log_json).then(fmt::layer))
        .with(EnvFilter::from_default_env().add_directive("brawl=info".parse()?))
        .init();

    info!("Project Brawl starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::or_defaults(read, &config_path);

    if init {
        config
            .save_to(&config_path)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        return Ok(());
    }

    let mut runner = MatchRunner::new(config)?;
    let summary = runner.run();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("Project Brawl shutdown complete");
    Ok(())
}
