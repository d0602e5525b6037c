//! Stage data and map environment effects.
//!
//! A stage is an ordered platform list plus multipliers, spawn points and
//! optional hazards. The simulation core does not know about hazards; they
//! are applied here through the fighters' public damage and stun mutators.

use std::fs;
use std::path::Path;

use brawl_common::{BrawlError, BrawlResult};
use brawl_gameplay::arena::{Arena, Environment};
use brawl_gameplay::attack::Damageable;
use brawl_gameplay::physics::WorldBounds;
use brawl_gameplay::platform::Platform;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from loading a stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// File could not be read
    #[error("failed to read stage: {0}")]
    Io(#[from] std::io::Error),

    /// Not valid stage TOML
    #[error("failed to parse stage: {0}")]
    Parse(#[from] toml::de::Error),

    /// Stage data breaks a rule
    #[error("invalid stage '{stage}': {reason}")]
    Invalid {
        /// Stage name
        stage: String,
        /// What is wrong
        reason: String,
    },
}

impl From<StageError> for BrawlError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Io(e) => Self::Io(e),
            other => Self::Stage(other.to_string()),
        }
    }
}

/// A platform entry. File order is collision order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Left edge
    pub x: i32,
    /// Top edge (landing surface)
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
    /// Bottom-most platform, never dropped through
    #[serde(default)]
    pub ground: bool,
    /// Considered by collision
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl PlatformConfig {
    /// Builds the platform.
    #[must_use]
    pub fn build(&self) -> Platform {
        let platform = if self.ground {
            Platform::ground(self.x, self.y, self.width, self.height)
        } else {
            Platform::new(self.x, self.y, self.width, self.height)
        };
        if self.active {
            platform
        } else {
            platform.inactive()
        }
    }
}

/// Spawn position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    /// X position
    pub x: i32,
    /// Y position
    pub y: i32,
}

/// Map hazards. An interval of zero disables the hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Damage dealt to grounded fighters on each burn tick
    pub burn_damage: i32,
    /// Ticks between burns
    pub burn_interval: u32,
    /// Stun length of each forced stun
    pub stun_frames: u32,
    /// Ticks between forced stuns
    pub stun_interval: u32,
}

/// A stage file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Stage name
    pub name: String,
    /// Gravity multiplier
    pub gravity_mod: f32,
    /// Horizontal speed multiplier
    pub speed_mod: f32,
    /// Playable area
    pub world: WorldBounds,
    /// Player spawn
    pub player_spawn: Spawn,
    /// Boss spawn
    pub boss_spawn: Spawn,
    /// Hazards
    pub hazards: HazardConfig,
    /// Platforms in collision order
    pub platforms: Vec<PlatformConfig>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            name: "Training Grounds".to_string(),
            gravity_mod: 1.0,
            speed_mod: 1.0,
            world: WorldBounds::default(),
            player_spawn: Spawn { x: 200, y: 500 },
            boss_spawn: Spawn { x: 1000, y: 500 },
            hazards: HazardConfig::default(),
            platforms: vec![
                PlatformConfig {
                    x: 150,
                    y: 480,
                    width: 260,
                    height: 20,
                    ground: false,
                    active: true,
                },
                PlatformConfig {
                    x: 870,
                    y: 480,
                    width: 260,
                    height: 20,
                    ground: false,
                    active: true,
                },
                PlatformConfig {
                    x: 490,
                    y: 340,
                    width: 300,
                    height: 20,
                    ground: false,
                    active: true,
                },
                PlatformConfig {
                    x: 0,
                    y: 640,
                    width: 1280,
                    height: 80,
                    ground: true,
                    active: true,
                },
            ],
        }
    }
}

impl StageConfig {
    /// Parses and validates stage TOML.
    pub fn from_toml(text: &str) -> Result<Self, StageError> {
        let stage: Self = toml::from_str(text)?;
        stage.validate()?;
        Ok(stage)
    }

    /// Reads and validates a stage file.
    pub fn load<P: AsRef<Path>>(path: P) -> BrawlResult<Self> {
        let path = path.as_ref();
        let stage = Self::from_toml(&fs::read_to_string(path)?)?;
        info!(
            "Loaded stage '{}' ({} platforms) from {}",
            stage.name,
            stage.platforms.len(),
            path.display()
        );
        Ok(stage)
    }

    /// Checks dimensions, multipliers and spawns.
    pub fn validate(&self) -> Result<(), StageError> {
        let invalid = |reason: &str| StageError::Invalid {
            stage: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.world.width <= 0 || self.world.floor <= 0 {
            return Err(invalid("world size must be positive"));
        }
        if self.gravity_mod < 0.0 || self.speed_mod < 0.0 {
            return Err(invalid("multipliers must not be negative"));
        }
        if self.platforms.iter().any(|p| p.width <= 0 || p.height <= 0) {
            return Err(invalid("platform size must be positive"));
        }
        if self.platforms.iter().filter(|p| p.ground).count() > 1 {
            return Err(invalid("only one ground platform is allowed"));
        }
        for spawn in [self.player_spawn, self.boss_spawn] {
            if spawn.x < 0 || spawn.x > self.world.width {
                return Err(invalid("spawn outside the world"));
            }
        }
        if self.hazards.burn_damage < 0 {
            return Err(invalid("burn damage must not be negative"));
        }
        Ok(())
    }

    /// Platforms in file order.
    #[must_use]
    pub fn build_platforms(&self) -> Vec<Platform> {
        self.platforms.iter().map(PlatformConfig::build).collect()
    }

    /// Stage multipliers for the arena.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        Environment {
            gravity_mod: self.gravity_mod,
            speed_mod: self.speed_mod,
        }
    }
}

/// Applies a stage's hazards once per tick.
#[derive(Debug, Clone)]
pub struct MapEffects {
    config: HazardConfig,
    ticks: u64,
}

impl MapEffects {
    /// Creates hazard bookkeeping for a stage.
    #[must_use]
    pub const fn new(config: HazardConfig) -> Self {
        Self { config, ticks: 0 }
    }

    /// Restarts the hazard clocks, e.g. at a new round.
    pub fn reset(&mut self) {
        self.ticks = 0;
    }

    /// Advances one tick and applies any hazard that comes due.
    /// Returns the number of fighters affected.
    pub fn apply(&mut self, arena: &mut Arena) -> usize {
        self.ticks += 1;
        let due = |interval: u32| interval > 0 && self.ticks % u64::from(interval) == 0;
        let burn = due(self.config.burn_interval) && self.config.burn_damage > 0;
        let stun = due(self.config.stun_interval) && self.config.stun_frames > 0;
        if !burn && !stun {
            return 0;
        }

        let mut affected = 0;
        for contender in arena.contenders_mut() {
            let fighter = contender.fighter_mut();
            if !fighter.is_alive() {
                continue;
            }
            if burn && fighter.is_on_ground() {
                fighter.take_damage(self.config.burn_damage);
                affected += 1;
            }
            if stun {
                fighter.stun(self.config.stun_frames);
                affected += 1;
            }
        }
        debug!("Map hazards hit {} times on tick {}", affected, self.ticks);
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_common::Team;
    use brawl_gameplay::animation::ClipPlayer;
    use brawl_gameplay::fighter::{Fighter, FighterStats};
    use brawl_gameplay::input::{InputState, KeyBindings};
    use brawl_gameplay::player::Player;
    use tempfile::TempDir;

    const RUINS: &str = r#"
name = "Ruins"
gravity_mod = 0.5
speed_mod = 1.2

[world]
width = 1000
floor = 600

[player_spawn]
x = 100
y = 400

[boss_spawn]
x = 800
y = 400

[hazards]
burn_damage = 2
burn_interval = 30

[[platforms]]
x = 200
y = 450
width = 200
height = 20

[[platforms]]
x = 0
y = 560
width = 1000
height = 40
ground = true
"#;

    fn arena_with_hazards(hazards: HazardConfig) -> (Arena, MapEffects) {
        let stage = StageConfig {
            hazards,
            ..StageConfig::default()
        };
        let mut arena = Arena::new(stage.build_platforms(), stage.environment());
        let fighter = Fighter::new(
            "target",
            Team::Players,
            &FighterStats::default(),
            200,
            500,
            Box::new(ClipPlayer::new()),
        );
        arena.add_player(Player::new(fighter, KeyBindings::wasd()));
        (arena, MapEffects::new(stage.hazards))
    }

    #[test]
    fn test_parse_stage_file() {
        let stage = StageConfig::from_toml(RUINS).expect("parse");
        assert_eq!(stage.name, "Ruins");
        assert_eq!(stage.world, WorldBounds::new(1000, 600));
        assert_eq!(stage.hazards.burn_interval, 30);
        assert_eq!(stage.hazards.stun_interval, 0);

        let platforms = stage.build_platforms();
        assert_eq!(platforms.len(), 2);
        assert!(!platforms[0].is_ground());
        assert!(platforms[1].is_ground());
        assert!(platforms[1].is_active());
        assert_eq!(stage.environment().gravity_mod, 0.5);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("ruins.toml");
        fs::write(&path, RUINS).expect("write");
        assert_eq!(StageConfig::load(&path).expect("load").platforms.len(), 2);

        let missing = StageConfig::load(dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(BrawlError::Io(_))));

        fs::write(&path, "[world]\nwidth = 0\nfloor = 600\n").expect("write");
        let invalid = StageConfig::load(&path);
        assert!(matches!(invalid, Err(BrawlError::Stage(msg)) if msg.contains("world size")));
    }

    #[test]
    fn test_default_stage_is_valid() {
        let stage = StageConfig::default();
        stage.validate().expect("default stage");
        let text = toml::to_string_pretty(&stage).expect("serialize");
        assert_eq!(StageConfig::from_toml(&text).expect("parse back"), stage);
    }

    #[test]
    fn test_rejects_bad_stage() {
        let mut stage = StageConfig::default();
        stage.platforms[0].ground = true;
        assert!(matches!(stage.validate(), Err(StageError::Invalid { .. })));

        let mut stage = StageConfig::default();
        stage.boss_spawn.x = 5000;
        assert!(stage.validate().is_err());

        assert!(matches!(
            StageConfig::from_toml("platforms = 3"),
            Err(StageError::Parse(_))
        ));
    }

    #[test]
    fn test_burn_only_hits_grounded_fighters() {
        let (mut arena, mut effects) = arena_with_hazards(HazardConfig {
            burn_damage: 5,
            burn_interval: 2,
            ..HazardConfig::default()
        });
        let input = InputState::new();

        // Falling from the spawn, not yet grounded
        assert_eq!(effects.apply(&mut arena), 0);
        assert_eq!(effects.apply(&mut arena), 0);

        for _ in 0..60 {
            arena.tick(&input);
        }
        effects.reset();
        effects.apply(&mut arena);
        assert_eq!(effects.apply(&mut arena), 1);
        assert_eq!(arena.contenders()[0].fighter().health(), 95);
    }

    #[test]
    fn test_periodic_stun() {
        let (mut arena, mut effects) = arena_with_hazards(HazardConfig {
            stun_frames: 20,
            stun_interval: 3,
            ..HazardConfig::default()
        });
        effects.apply(&mut arena);
        effects.apply(&mut arena);
        assert!(!arena.contenders()[0].fighter().is_stunned());
        assert_eq!(effects.apply(&mut arena), 1);
        assert!(arena.contenders()[0].fighter().is_stunned());
    }
}
