//! Attack abilities.
//!
//! This module provides:
//! - The shared cooldown/active contract every ability follows
//! - The capability traits the manager dispatches on
//! - Concrete abilities: melee swing, area burst, projectile, targeted
//!   strike, pull zone, and global burst
//!
//! Attacks never own their fighter. Whoever executes one passes an
//! [`AttackOrigin`] snapshot of the attacker and the targets to affect.

mod area;
mod burst;
mod melee;
mod projectile;
mod strike;
mod zone;

pub use area::AreaAttack;
pub use burst::{BurstEffect, GlobalBurst};
pub use melee::MeleeAttack;
pub use projectile::{HitEffect, Projectile, ProjectileAttack};
pub use strike::{StrikePhase, TargetedStrike};
pub use zone::PullZone;

use brawl_common::{Circle, EntityId, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something attacks can hurt.
pub trait Damageable {
    /// Returns the fighter's ID.
    fn id(&self) -> EntityId;

    /// Returns the hurtbox.
    fn bounds(&self) -> Rect;

    /// Returns whether the fighter still has health.
    fn is_alive(&self) -> bool;

    /// Removes health, never below zero.
    fn take_damage(&mut self, amount: i32);

    /// Blocks movement and new attacks for a number of frames.
    fn stun(&mut self, frames: u32);

    /// Halves movement speed for a number of frames.
    fn slow(&mut self, frames: u32);

    /// Shoves horizontally (positive = right).
    fn push_back(&mut self, force: f32);

    /// Sets vertical velocity (negative = up).
    fn push_vertical(&mut self, force: f32);
}

/// Snapshot of the attacker taken when an effect is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackOrigin {
    /// Attacker ID
    pub id: EntityId,
    /// Attacker bounds at the moment of the effect
    pub bounds: Rect,
    /// Whether the attacker faces right
    pub facing_right: bool,
}

impl AttackOrigin {
    /// Creates an origin snapshot.
    #[must_use]
    pub const fn new(id: EntityId, bounds: Rect, facing_right: bool) -> Self {
        Self {
            id,
            bounds,
            facing_right,
        }
    }

    /// Horizontal direction as a sign.
    #[must_use]
    pub const fn direction(&self) -> f32 {
        if self.facing_right {
            1.0
        } else {
            -1.0
        }
    }

    /// X coordinate of the edge the attacker faces.
    #[must_use]
    pub const fn leading_edge(&self) -> i32 {
        if self.facing_right {
            self.bounds.right()
        } else {
            self.bounds.x
        }
    }

    /// Center of the attacker.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        self.bounds.center()
    }

    /// Center of the closest living target, if any.
    #[must_use]
    pub fn nearest_target(&self, targets: &[&mut dyn Damageable]) -> Option<(f32, f32)> {
        let (cx, _) = self.center();
        targets
            .iter()
            .filter(|t| t.id() != self.id && t.is_alive())
            .map(|t| t.bounds().center())
            .min_by(|a, b| (a.0 - cx).abs().total_cmp(&(b.0 - cx).abs()))
    }
}

/// Ability family, used for logging and render hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Rectangular swing at the leading edge
    Melee,
    /// Instant circular burst around the attacker
    Area,
    /// Travelling projectiles
    Projectile,
    /// Telegraphed vertical lane strike
    TargetedStrike,
    /// Lingering zone that pulls and ticks damage
    PullZone,
    /// Effect on every opponent regardless of position
    GlobalBurst,
}

/// Cooldown and active-window bookkeeping shared by all attacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackState {
    name: String,
    damage: i32,
    cooldown: u32,
    current_cooldown: u32,
    active: bool,
    active_frames: u32,
    active_timer: u32,
}

impl AttackState {
    /// Creates a ready attack state.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: i32, cooldown: u32, active_frames: u32) -> Self {
        Self {
            name: name.into(),
            damage,
            cooldown,
            current_cooldown: 0,
            active: false,
            active_frames,
            active_timer: 0,
        }
    }

    /// Changes how long the active window lasts.
    #[must_use]
    pub fn with_active_frames(mut self, frames: u32) -> Self {
        self.active_frames = frames;
        self
    }

    /// Attack name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Damage per hit.
    #[must_use]
    pub const fn damage(&self) -> i32 {
        self.damage
    }

    /// Full cooldown in frames.
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Frames left before the attack can be used again.
    #[must_use]
    pub const fn current_cooldown(&self) -> u32 {
        self.current_cooldown
    }

    /// Returns whether the attack's visual window is open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the cooldown has run out.
    #[must_use]
    pub const fn can_use(&self) -> bool {
        self.current_cooldown == 0
    }

    /// Starts the cooldown and opens the active window.
    pub fn start(&mut self) {
        self.start_cooldown();
        self.activate();
    }

    /// Starts the cooldown only.
    pub fn start_cooldown(&mut self) {
        self.current_cooldown = self.cooldown;
    }

    /// Opens the active window, from the moment the effect lands.
    pub fn activate(&mut self) {
        self.active = true;
        self.active_timer = self.active_frames;
    }

    /// Counts down cooldown and the active window by one frame.
    pub fn tick(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
        if self.active {
            self.active_timer = self.active_timer.saturating_sub(1);
            if self.active_timer == 0 {
                self.active = false;
            }
        }
    }

    /// Makes the attack ready again.
    pub fn reset(&mut self) {
        self.current_cooldown = 0;
        self.active = false;
        self.active_timer = 0;
    }
}

/// Draw data handed to the renderer. Purely descriptive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackVisual {
    /// Melee hitbox
    Hitbox {
        /// Attack name
        attack: String,
        /// Hitbox in world space
        rect: Rect,
    },
    /// Area burst ring
    Burst {
        /// Attack name
        attack: String,
        /// Burst circle
        circle: Circle,
    },
    /// Projectile in flight
    Projectile {
        /// Attack name
        attack: String,
        /// Projectile circle
        circle: Circle,
    },
    /// Strike lane, telegraphed or striking
    StrikeLane {
        /// Attack name
        attack: String,
        /// Lane rectangle
        rect: Rect,
        /// Whether the lane is dealing damage
        striking: bool,
    },
    /// Pull zone
    Zone {
        /// Attack name
        attack: String,
        /// Zone circle
        circle: Circle,
    },
    /// Screen-wide flash
    Flash {
        /// Attack name
        attack: String,
    },
}

/// Attacks that keep projectiles alive between frames.
pub trait HasProjectiles {
    /// Projectiles currently in flight.
    fn projectiles(&self) -> &[Projectile];

    /// Hits targets with live projectiles. Each projectile damages at most one
    /// target and is removed on hit. Returns the number of hits.
    fn check_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize;

    /// Removes every projectile.
    fn clear_projectiles(&mut self);
}

/// Attacks whose effect lingers and is resolved once per frame.
pub trait LingeringHazard {
    /// Returns whether the hazard is still on the field.
    fn is_live(&self) -> bool;

    /// Applies this frame's effect. Returns the number of damage hits.
    fn resolve(&mut self, targets: &mut [&mut dyn Damageable]) -> usize;
}

/// Common contract for every combat ability.
pub trait Attack: fmt::Debug {
    /// Ability family.
    fn kind(&self) -> AttackKind;

    /// Shared bookkeeping.
    fn state(&self) -> &AttackState;

    /// Shared bookkeeping, mutable.
    fn state_mut(&mut self) -> &mut AttackState;

    /// Applies the attack's effect without checking or starting the cooldown.
    /// Returns the number of targets hit.
    fn apply(&mut self, origin: &AttackOrigin, targets: &mut [&mut dyn Damageable]) -> usize;

    /// Appends draw data for the renderer.
    fn visuals(&self, origin: &AttackOrigin, out: &mut Vec<AttackVisual>);

    /// Attack name.
    fn name(&self) -> &str {
        self.state().name()
    }

    /// Returns whether the cooldown has run out.
    fn can_use(&self) -> bool {
        self.state().can_use()
    }

    /// Starts the cooldown and active window.
    fn start(&mut self) {
        self.state_mut().start();
    }

    /// Uses the attack if off cooldown. Does nothing and returns false
    /// otherwise.
    fn execute(&mut self, origin: &AttackOrigin, targets: &mut [&mut dyn Damageable]) -> bool {
        if !self.can_use() {
            return false;
        }
        self.start();
        self.apply(origin, targets);
        true
    }

    /// Advances one frame.
    fn update(&mut self) {
        self.state_mut().tick();
    }

    /// Returns to the ready state, dropping anything in flight.
    fn reset(&mut self) {
        self.state_mut().reset();
    }

    /// Projectile capability, if this attack has one.
    fn as_projectiles(&mut self) -> Option<&mut dyn HasProjectiles> {
        None
    }

    /// Lingering hazard capability, if this attack has one.
    fn as_hazard(&mut self) -> Option<&mut dyn LingeringHazard> {
        None
    }
}

/// Checks whether a target is hittable by an attacker.
pub(crate) fn is_opponent(owner: EntityId, target: &dyn Damageable) -> bool {
    target.id() != owner && target.is_alive()
}
