//! Engine configuration.
//!
//! Match length, characters, data file locations, physics tuning and
//! logging. Loaded from TOML; a missing or broken file falls back to
//! defaults.

use brawl_gameplay::ai::{AggressiveTuning, AiBehavior};
use brawl_gameplay::physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "brawl.toml";

/// Errors from reading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No file at the path
    #[error("config file {0} not found")]
    Missing(PathBuf),

    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// File is not valid TOML for this struct
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Timing ===
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Pace ticks against the wall clock instead of running flat out
    pub realtime: bool,

    // === Match ===
    /// Rounds to play
    pub rounds: u32,
    /// Ticks before a round is called a timeout
    pub max_ticks_per_round: u32,
    /// Seed for boss and autopilot randomness
    pub seed: u64,
    /// Player character name
    pub player: String,
    /// Boss character name
    pub boss: String,

    // === Data ===
    /// Stage file (built-in stage when absent)
    pub stage_path: Option<PathBuf>,
    /// Roster file (built-in roster when absent)
    pub roster_path: Option<PathBuf>,

    // === Logging ===
    /// Emit JSON log lines
    pub log_json: bool,

    // === Simulation ===
    /// Strategy that plays the player's side through the key mapping
    pub player_ai: AiBehavior,
    /// Physics tuning
    pub physics: PhysicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            realtime: false,

            rounds: 3,
            max_ticks_per_round: 60 * 90,
            seed: 0x5EED,
            player: "Knight".to_string(),
            boss: "Warden".to_string(),

            stage_path: None,
            roster_path: None,

            log_json: false,

            player_ai: AiBehavior::Aggressive(AggressiveTuning {
                preferred_distance: 60.0,
                melee_range: 70.0,
                ..AggressiveTuning::default()
            }),
            physics: PhysicsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reads a config file without falling back or logging.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.validate();
        Ok(config)
    }

    /// Resolves a read result to a config, logging what happened.
    pub fn or_defaults(result: Result<Self, ConfigError>, path: &Path) -> Self {
        match result {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Missing(_)) => {
                info!("Config file not found, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.rounds = self.rounds.clamp(1, 99);
        self.max_ticks_per_round = self.max_ticks_per_round.max(1);
        self.physics.landing_band = self.physics.landing_band.max(1);
        self.physics.max_fall_speed = self.physics.max_fall_speed.max(0.1);
    }
}
