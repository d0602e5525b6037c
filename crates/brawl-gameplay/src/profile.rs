//! Character profiles and the roster.
//!
//! A [`CharacterProfile`] is plain data: body stats, clip set, gated attack
//! specs, and boss tuning for computer-controlled characters. Rosters load
//! from RON, and a built-in roster is always available.

use std::path::Path;

use ahash::AHashSet;
use brawl_common::{BrawlError, BrawlResult, Team};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::ai::{AggressiveTuning, AiBehavior, ArtilleryTuning, DefensiveTuning, DuelistTuning};
use crate::animation::{Clip, ClipPlayer};
use crate::attack::{
    AreaAttack, Attack, BurstEffect, GlobalBurst, HitEffect, MeleeAttack, ProjectileAttack,
    PullZone, TargetedStrike,
};
use crate::boss::{BarrageTuning, Boss, BossTuning, SpecialKind, SupportMove};
use crate::fighter::{Fighter, FighterStats, CLIP_IDLE, CLIP_JUMP, CLIP_RUN};
use crate::gate::{AttackSlot, GateSpec};
use crate::physics::{PhysicsConfig, WorldBounds};

/// Errors raised while loading or validating profiles.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Roster file could not be read
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    /// Roster text is not valid RON
    #[error("failed to parse roster: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Roster could not be written
    #[error("failed to serialize roster: {0}")]
    Serialize(#[from] ron::Error),

    /// A profile breaks a rule
    #[error("invalid character '{character}': {reason}")]
    Invalid {
        /// Character name
        character: String,
        /// What is wrong
        reason: String,
    },

    /// Two profiles share a name
    #[error("duplicate character '{0}'")]
    Duplicate(String),

    /// No profile with that name
    #[error("unknown character '{0}'")]
    UnknownCharacter(String),

    /// Profile has no boss tuning
    #[error("character '{0}' cannot be a boss")]
    NotABoss(String),
}

impl From<ProfileError> for BrawlError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Io(e) => Self::Io(e),
            ProfileError::UnknownCharacter(name) => Self::UnknownCharacter(name),
            ProfileError::Serialize(e) => Self::Serialization(e.to_string()),
            other => Self::Roster(other.to_string()),
        }
    }
}

/// Data description of one attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackSpec {
    /// [`MeleeAttack`]
    Melee {
        /// Attack name
        name: String,
        /// Damage per hit
        damage: i32,
        /// Cooldown in frames
        cooldown: u32,
        /// Hitbox width
        range: i32,
        /// Visible frames
        active_frames: Option<u32>,
        /// Fixed hitbox height
        height: Option<i32>,
        /// Shove strength
        knockback: Option<f32>,
    },
    /// [`AreaAttack`]
    Area {
        /// Attack name
        name: String,
        /// Damage per hit
        damage: i32,
        /// Cooldown in frames
        cooldown: u32,
        /// Burst radius
        radius: f32,
        /// Visible frames
        active_frames: Option<u32>,
        /// Upward launch speed
        launch: Option<f32>,
    },
    /// [`ProjectileAttack`]
    Projectile {
        /// Attack name
        name: String,
        /// Damage per hit
        damage: i32,
        /// Cooldown in frames
        cooldown: u32,
        /// Pixels per frame
        speed: f32,
        /// Collision radius
        radius: Option<f32>,
        /// Frames before the projectile fizzles
        lifetime: Option<u32>,
        /// Side effect on hit
        #[serde(default)]
        hit_effect: HitEffect,
    },
    /// [`TargetedStrike`]
    Strike {
        /// Attack name
        name: String,
        /// Damage per hit
        damage: i32,
        /// Cooldown in frames
        cooldown: u32,
        /// Telegraph frames
        windup_frames: u32,
        /// Damaging frames
        strike_frames: u32,
        /// Lane width
        lane_width: Option<i32>,
    },
    /// [`PullZone`]
    Zone {
        /// Attack name
        name: String,
        /// Damage per tick
        damage: i32,
        /// Cooldown in frames
        cooldown: u32,
        /// Zone radius
        radius: f32,
        /// Pull per frame
        pull_force: f32,
        /// Frames between damage ticks
        tick_interval: u32,
        /// Frames the zone lasts
        duration: u32,
        /// Distance in front of the attacker
        offset: Option<f32>,
    },
    /// [`GlobalBurst`]
    Burst {
        /// Attack name
        name: String,
        /// Damage per hit
        damage: i32,
        /// Cooldown in frames
        cooldown: u32,
        /// Effect on every opponent
        effect: BurstEffect,
    },
}

impl AttackSpec {
    /// Attack name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Melee { name, .. }
            | Self::Area { name, .. }
            | Self::Projectile { name, .. }
            | Self::Strike { name, .. }
            | Self::Zone { name, .. }
            | Self::Burst { name, .. } => name,
        }
    }

    const fn damage(&self) -> i32 {
        match self {
            Self::Melee { damage, .. }
            | Self::Area { damage, .. }
            | Self::Projectile { damage, .. }
            | Self::Strike { damage, .. }
            | Self::Zone { damage, .. }
            | Self::Burst { damage, .. } => *damage,
        }
    }

    /// Checks the spec for values the attack types cannot use.
    pub fn validate(&self) -> Result<(), String> {
        if self.name().trim().is_empty() {
            return Err("attack name is empty".to_string());
        }
        if self.damage() < 0 {
            return Err(format!("attack '{}' has negative damage", self.name()));
        }
        let bad = match self {
            Self::Melee { range, .. } => (*range <= 0).then_some("range must be positive"),
            Self::Area { radius, .. } => (*radius <= 0.0).then_some("radius must be positive"),
            Self::Projectile { speed, .. } => (*speed <= 0.0).then_some("speed must be positive"),
            Self::Strike { strike_frames, .. } => {
                (*strike_frames == 0).then_some("strike needs at least one frame")
            }
            Self::Zone {
                radius,
                tick_interval,
                ..
            } => {
                if *radius <= 0.0 {
                    Some("radius must be positive")
                } else {
                    (*tick_interval == 0).then_some("tick interval must be positive")
                }
            }
            Self::Burst { .. } => None,
        };
        match bad {
            Some(reason) => Err(format!("attack '{}': {reason}", self.name())),
            None => Ok(()),
        }
    }

    /// Builds the attack for a world.
    #[must_use]
    pub fn build(&self, world: WorldBounds) -> Box<dyn Attack> {
        match self.clone() {
            Self::Melee {
                name,
                damage,
                cooldown,
                range,
                active_frames,
                height,
                knockback,
            } => {
                let mut attack = MeleeAttack::new(name, damage, cooldown, range);
                if let Some(frames) = active_frames {
                    attack = attack.with_active_frames(frames);
                }
                if let Some(height) = height {
                    attack = attack.with_height(height);
                }
                if let Some(force) = knockback {
                    attack = attack.with_knockback(force);
                }
                Box::new(attack)
            }
            Self::Area {
                name,
                damage,
                cooldown,
                radius,
                active_frames,
                launch,
            } => {
                let mut attack = AreaAttack::new(name, damage, cooldown, radius);
                if let Some(frames) = active_frames {
                    attack = attack.with_active_frames(frames);
                }
                if let Some(speed) = launch {
                    attack = attack.with_launch(speed);
                }
                Box::new(attack)
            }
            Self::Projectile {
                name,
                damage,
                cooldown,
                speed,
                radius,
                lifetime,
                hit_effect,
            } => {
                let mut attack = ProjectileAttack::new(name, damage, cooldown, speed)
                    .with_hit_effect(hit_effect)
                    .with_bounds(world);
                if let Some(radius) = radius {
                    attack = attack.with_radius(radius);
                }
                if let Some(frames) = lifetime {
                    attack = attack.with_lifetime(frames);
                }
                Box::new(attack)
            }
            Self::Strike {
                name,
                damage,
                cooldown,
                windup_frames,
                strike_frames,
                lane_width,
            } => {
                let mut attack =
                    TargetedStrike::new(name, damage, cooldown, windup_frames, strike_frames)
                        .with_bounds(world);
                if let Some(width) = lane_width {
                    attack = attack.with_lane_width(width);
                }
                Box::new(attack)
            }
            Self::Zone {
                name,
                damage,
                cooldown,
                radius,
                pull_force,
                tick_interval,
                duration,
                offset,
            } => Box::new(
                PullZone::new(
                    name,
                    damage,
                    cooldown,
                    radius,
                    pull_force,
                    tick_interval,
                    duration,
                )
                .with_offset(offset.unwrap_or(0.0)),
            ),
            Self::Burst {
                name,
                damage,
                cooldown,
                effect,
            } => Box::new(GlobalBurst::new(name, damage, cooldown, effect)),
        }
    }
}

/// An attack played through a clip, firing on trigger frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatedAttack {
    /// The attack
    pub attack: AttackSpec,
    /// Clip forced when the attack starts
    pub clip: String,
    /// Frame indices that release the effect
    pub trigger_frames: Vec<usize>,
}

impl GatedAttack {
    /// Creates a gated attack.
    #[must_use]
    pub fn new(attack: AttackSpec, clip: impl Into<String>, trigger_frames: &[usize]) -> Self {
        Self {
            attack,
            clip: clip.into(),
            trigger_frames: trigger_frames.to_vec(),
        }
    }

    /// Gate spec for binding to a fighter slot.
    #[must_use]
    pub fn gate_spec(&self) -> GateSpec {
        GateSpec::new(self.attack.name(), self.clip.as_str(), &self.trigger_frames)
    }
}

/// One playable or boss character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterProfile {
    /// Display name, unique in a roster
    pub name: String,
    /// Body and movement stats
    pub stats: FighterStats,
    /// Clip set
    pub animations: Vec<Clip>,
    /// Primary melee
    pub melee: Option<GatedAttack>,
    /// Primary ranged
    pub ranged: Option<GatedAttack>,
    /// Special slot
    pub special: Option<GatedAttack>,
    /// Extra attacks reachable by name only
    pub extra: Vec<AttackSpec>,
    /// Present for computer-controlled characters
    pub boss: Option<BossTuning>,
}

impl Default for CharacterProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            stats: FighterStats::default(),
            animations: standard_clips(false),
            melee: None,
            ranged: None,
            special: None,
            extra: Vec::new(),
            boss: None,
        }
    }
}

impl CharacterProfile {
    /// Gated attacks with their slots.
    pub fn gated(&self) -> impl Iterator<Item = (AttackSlot, &GatedAttack)> {
        [
            (AttackSlot::Melee, self.melee.as_ref()),
            (AttackSlot::Ranged, self.ranged.as_ref()),
            (AttackSlot::Special, self.special.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, gated)| gated.map(|g| (slot, g)))
    }

    /// Checks stats, attacks, trigger frames against clips, and boss
    /// requirements.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |reason: String| ProfileError::Invalid {
            character: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        let stats = &self.stats;
        if stats.width <= 0 || stats.height <= 0 {
            return Err(invalid("size must be positive".to_string()));
        }
        if stats.max_health <= 0 {
            return Err(invalid("max health must be positive".to_string()));
        }
        if stats.move_speed < 0.0 || stats.jump_strength < 0.0 {
            return Err(invalid("speeds must not be negative".to_string()));
        }

        for (slot, gated) in self.gated() {
            gated.attack.validate().map_err(invalid)?;
            if gated.trigger_frames.is_empty() {
                return Err(invalid(format!("{slot:?} attack has no trigger frames")));
            }
            let Some(clip) = self.animations.iter().find(|c| c.name == gated.clip) else {
                return Err(invalid(format!("{slot:?} clip '{}' is missing", gated.clip)));
            };
            if let Some(frame) = gated.trigger_frames.iter().find(|&&f| f >= clip.frames) {
                return Err(invalid(format!(
                    "{slot:?} trigger frame {frame} is past the end of '{}'",
                    clip.name
                )));
            }
        }
        for spec in &self.extra {
            spec.validate().map_err(invalid)?;
        }

        if let Some(boss) = &self.boss {
            match &boss.special {
                SpecialKind::Signature if self.special.is_none() => {
                    return Err(invalid("signature special needs a special attack".to_string()));
                }
                SpecialKind::StrikeBarrage(barrage) if barrage.count == 0 => {
                    return Err(invalid("barrage needs at least one strike".to_string()));
                }
                _ => {}
            }
            let registered = |name: &str| {
                self.extra.iter().any(|spec| spec.name() == name)
                    || self.gated().any(|(_, gated)| gated.attack.name() == name)
            };
            if let Some(support) = boss.support.iter().find(|m| !registered(&m.attack)) {
                return Err(invalid(format!(
                    "support move '{}' is not registered",
                    support.attack
                )));
            }
        }
        Ok(())
    }

    /// Builds a fighter with every attack registered and gates bound.
    #[must_use]
    pub fn build_fighter(
        &self,
        team: Team,
        x: i32,
        y: i32,
        physics: &PhysicsConfig,
        world: WorldBounds,
    ) -> Fighter {
        let animator = ClipPlayer::with_clips(self.animations.iter().cloned());
        let mut fighter = Fighter::new(&self.name, team, &self.stats, x, y, Box::new(animator))
            .with_physics(physics.clone(), world);

        for (slot, gated) in self.gated() {
            fighter.register_attack(gated.attack.build(world));
            fighter.bind_gate(slot, gated.gate_spec());
        }
        for spec in &self.extra {
            fighter.register_attack(spec.build(world));
        }
        fighter
    }

    /// Builds this character as a boss.
    pub fn build_boss(
        &self,
        x: i32,
        y: i32,
        physics: &PhysicsConfig,
        world: WorldBounds,
        seed: u64,
    ) -> Result<Boss, ProfileError> {
        let tuning = self
            .boss
            .clone()
            .ok_or_else(|| ProfileError::NotABoss(self.name.clone()))?;
        let fighter = self.build_fighter(Team::Bosses, x, y, physics, world);
        Ok(Boss::new(fighter, tuning, seed))
    }
}

/// A set of characters with unique names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Characters in file order
    pub characters: Vec<CharacterProfile>,
}

impl Roster {
    /// Parses and validates a RON roster.
    pub fn from_ron(text: &str) -> Result<Self, ProfileError> {
        let roster: Self = ron::from_str(text)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Reads and validates a RON roster file.
    pub fn load(path: impl AsRef<Path>) -> BrawlResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let roster = Self::from_ron(&text)?;
        info!(
            "Loaded {} characters from {}",
            roster.characters.len(),
            path.display()
        );
        Ok(roster)
    }

    /// Writes the roster as pretty RON.
    pub fn to_ron(&self) -> Result<String, ProfileError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Validates every profile and rejects duplicate names (case-insensitive).
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut seen = AHashSet::new();
        for profile in &self.characters {
            profile.validate()?;
            if !seen.insert(profile.name.to_lowercase()) {
                return Err(ProfileError::Duplicate(profile.name.clone()));
            }
        }
        Ok(())
    }

    /// Looks a character up by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<&CharacterProfile, ProfileError> {
        self.characters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                warn!("Unknown character '{}'", name);
                ProfileError::UnknownCharacter(name.to_string())
            })
    }

    /// Character names in roster order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|p| p.name.as_str())
    }

    /// Characters that can be bosses.
    pub fn bosses(&self) -> impl Iterator<Item = &CharacterProfile> {
        self.characters.iter().filter(|p| p.boss.is_some())
    }

    /// The built-in roster: two player characters and four bosses.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            characters: vec![
                knight(),
                ranger(),
                warden(),
                stormcaller(),
                voidmaw(),
                colossus(),
            ],
        }
    }
}

/// Idle, run, jump, attack, and shoot clips, plus a special clip for bosses.
#[must_use]
pub fn standard_clips(with_special: bool) -> Vec<Clip> {
    let mut clips = vec![
        Clip::looping(CLIP_IDLE, 4).with_ticks_per_frame(8),
        Clip::looping(CLIP_RUN, 6).with_ticks_per_frame(5),
        Clip::looping(CLIP_JUMP, 2).with_ticks_per_frame(6),
        Clip::once("attack", 8).with_ticks_per_frame(3),
        Clip::once("shoot", 6).with_ticks_per_frame(3),
    ];
    if with_special {
        clips.push(Clip::once("special", 10).with_ticks_per_frame(3));
    }
    clips
}

fn melee(name: &str, damage: i32, cooldown: u32, range: i32, knockback: Option<f32>) -> AttackSpec {
    AttackSpec::Melee {
        name: name.to_string(),
        damage,
        cooldown,
        range,
        active_frames: None,
        height: None,
        knockback,
    }
}

fn projectile(name: &str, damage: i32, cooldown: u32, speed: f32, hit_effect: HitEffect) -> AttackSpec {
    AttackSpec::Projectile {
        name: name.to_string(),
        damage,
        cooldown,
        speed,
        radius: None,
        lifetime: None,
        hit_effect,
    }
}

fn knight() -> CharacterProfile {
    CharacterProfile {
        name: "Knight".to_string(),
        stats: FighterStats {
            max_health: 120,
            ..FighterStats::default()
        },
        melee: Some(GatedAttack::new(
            melee("sword", 12, 30, 60, Some(4.0)),
            "attack",
            &[4],
        )),
        ranged: Some(GatedAttack::new(
            projectile("dagger", 8, 45, 9.0, HitEffect::None),
            "shoot",
            &[3],
        )),
        ..CharacterProfile::default()
    }
}

fn ranger() -> CharacterProfile {
    CharacterProfile {
        name: "Ranger".to_string(),
        stats: FighterStats {
            width: 44,
            height: 68,
            max_health: 90,
            move_speed: 6.0,
            jump_strength: 13.0,
        },
        melee: Some(GatedAttack::new(melee("kick", 6, 25, 40, None), "attack", &[3])),
        ranged: Some(GatedAttack::new(
            projectile("arrow", 12, 30, 12.0, HitEffect::Knockback { force: 3.0 }),
            "shoot",
            &[4],
        )),
        ..CharacterProfile::default()
    }
}

fn warden() -> CharacterProfile {
    CharacterProfile {
        name: "Warden".to_string(),
        stats: FighterStats {
            width: 64,
            height: 96,
            max_health: 300,
            move_speed: 3.0,
            jump_strength: 10.0,
        },
        animations: standard_clips(true),
        // Two pulses per swing
        melee: Some(GatedAttack::new(
            melee("halberd", 10, 50, 80, None),
            "attack",
            &[3, 6],
        )),
        special: Some(GatedAttack::new(
            melee("execution", 35, 200, 110, Some(10.0)),
            "special",
            &[8],
        )),
        boss: Some(BossTuning {
            behavior: AiBehavior::Duelist(DuelistTuning {
                preferred_distance: 90.0,
                melee_max: 120.0,
                ..DuelistTuning::default()
            }),
            special: SpecialKind::Signature,
            special_interval: 360,
            support: Vec::new(),
        }),
        ..CharacterProfile::default()
    }
}

fn stormcaller() -> CharacterProfile {
    CharacterProfile {
        name: "Stormcaller".to_string(),
        stats: FighterStats {
            width: 52,
            height: 84,
            max_health: 220,
            move_speed: 3.5,
            jump_strength: 11.0,
        },
        animations: standard_clips(true),
        melee: Some(GatedAttack::new(
            AttackSpec::Area {
                name: "shock".to_string(),
                damage: 8,
                cooldown: 60,
                radius: 70.0,
                active_frames: None,
                launch: None,
            },
            "attack",
            &[2],
        )),
        ranged: Some(GatedAttack::new(
            projectile("bolt", 10, 40, 8.0, HitEffect::Stun { frames: 20 }),
            "shoot",
            &[3],
        )),
        boss: Some(BossTuning {
            behavior: AiBehavior::Artillery(ArtilleryTuning::default()),
            special: SpecialKind::StrikeBarrage(BarrageTuning {
                name: "lightning".to_string(),
                count: 4,
                spread: 200.0,
                damage: 20,
                windup_frames: 60,
                strike_frames: 12,
                lane_width: 50,
            }),
            special_interval: 300,
            support: Vec::new(),
        }),
        ..CharacterProfile::default()
    }
}

fn voidmaw() -> CharacterProfile {
    CharacterProfile {
        name: "Voidmaw".to_string(),
        stats: FighterStats {
            width: 72,
            height: 80,
            max_health: 260,
            move_speed: 4.0,
            jump_strength: 9.0,
        },
        animations: standard_clips(true),
        melee: Some(GatedAttack::new(melee("bite", 14, 40, 60, None), "attack", &[4])),
        ranged: Some(GatedAttack::new(
            AttackSpec::Projectile {
                name: "spit".to_string(),
                damage: 8,
                cooldown: 70,
                speed: 7.0,
                radius: Some(10.0),
                lifetime: Some(90),
                hit_effect: HitEffect::None,
            },
            "shoot",
            &[3],
        )),
        special: Some(GatedAttack::new(
            AttackSpec::Zone {
                name: "singularity".to_string(),
                damage: 5,
                cooldown: 400,
                radius: 160.0,
                pull_force: 3.0,
                tick_interval: 20,
                duration: 180,
                offset: Some(120.0),
            },
            "special",
            &[6],
        )),
        boss: Some(BossTuning {
            behavior: AiBehavior::Aggressive(AggressiveTuning::default()),
            special: SpecialKind::Signature,
            special_interval: 420,
            support: Vec::new(),
        }),
        ..CharacterProfile::default()
    }
}

fn colossus() -> CharacterProfile {
    CharacterProfile {
        name: "Colossus".to_string(),
        stats: FighterStats {
            width: 88,
            height: 110,
            max_health: 400,
            move_speed: 2.5,
            jump_strength: 8.0,
        },
        animations: standard_clips(true),
        melee: Some(GatedAttack::new(
            AttackSpec::Area {
                name: "slam".to_string(),
                damage: 20,
                cooldown: 80,
                radius: 90.0,
                active_frames: None,
                launch: Some(8.0),
            },
            "attack",
            &[5],
        )),
        ranged: Some(GatedAttack::new(
            AttackSpec::Projectile {
                name: "boulder".to_string(),
                damage: 16,
                cooldown: 90,
                speed: 6.0,
                radius: Some(14.0),
                lifetime: None,
                hit_effect: HitEffect::Knockback { force: 6.0 },
            },
            "shoot",
            &[4],
        )),
        special: Some(GatedAttack::new(
            AttackSpec::Burst {
                name: "quake".to_string(),
                damage: 10,
                cooldown: 400,
                effect: BurstEffect::StunAndDamage { frames: 45 },
            },
            "special",
            &[7],
        )),
        extra: vec![AttackSpec::Burst {
            name: "roar".to_string(),
            damage: 0,
            cooldown: 600,
            effect: BurstEffect::Slow { frames: 120 },
        }],
        boss: Some(BossTuning {
            behavior: AiBehavior::Defensive(DefensiveTuning::default()),
            special: SpecialKind::Signature,
            special_interval: 480,
            support: vec![SupportMove {
                attack: "roar".to_string(),
                range: 250.0,
            }],
        }),
    }
}
