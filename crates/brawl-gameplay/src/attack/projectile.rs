//! Projectile attacks and their live projectiles.

use brawl_common::{Circle, EntityId};
use serde::{Deserialize, Serialize};

use super::{
    is_opponent, Attack, AttackKind, AttackOrigin, AttackState, AttackVisual, Damageable,
    HasProjectiles,
};
use crate::physics::WorldBounds;

/// Side effect applied to a target after projectile damage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum HitEffect {
    /// Damage only
    #[default]
    None,
    /// Stun the target
    Stun {
        /// Stun duration in frames
        frames: u32,
    },
    /// Shove the target along the projectile's travel direction
    Knockback {
        /// Shove strength
        force: f32,
    },
}

impl HitEffect {
    fn apply(self, target: &mut dyn Damageable, travel_dir: f32) {
        match self {
            Self::None => {}
            Self::Stun { frames } => target.stun(frames),
            Self::Knockback { force } => target.push_back(force * travel_dir),
        }
    }
}

/// A projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Center X
    pub x: f32,
    /// Center Y
    pub y: f32,
    /// Horizontal speed per frame
    pub vx: f32,
    /// Vertical speed per frame
    pub vy: f32,
    /// Damage on hit
    pub damage: i32,
    /// Collision radius
    pub radius: f32,
    /// Frames left before it fizzles, if limited
    pub ttl: Option<u32>,
    /// Fighter that fired it
    pub owner: EntityId,
}

impl Projectile {
    /// Collision circle.
    #[must_use]
    pub const fn circle(&self) -> Circle {
        Circle::new(self.x, self.y, self.radius)
    }

    /// Moves one frame. Returns false once the projectile should be culled.
    fn advance(&mut self, bounds: &WorldBounds) -> bool {
        self.x += self.vx;
        self.y += self.vy;
        if let Some(ttl) = self.ttl.as_mut() {
            *ttl = ttl.saturating_sub(1);
            if *ttl == 0 {
                return false;
            }
        }
        bounds.contains_point(self.x, self.y)
    }
}

/// Fires projectiles from the attacker's leading edge.
#[derive(Debug, Clone)]
pub struct ProjectileAttack {
    state: AttackState,
    speed: f32,
    radius: f32,
    lifetime: Option<u32>,
    on_hit: HitEffect,
    bounds: WorldBounds,
    live: Vec<Projectile>,
}

impl ProjectileAttack {
    /// Creates a projectile attack.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: i32, cooldown: u32, speed: f32) -> Self {
        Self {
            state: AttackState::new(name, damage, cooldown, 6),
            speed: speed.abs(),
            radius: 8.0,
            lifetime: None,
            on_hit: HitEffect::None,
            bounds: WorldBounds::default(),
            live: Vec::new(),
        }
    }

    /// Sets the collision radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(1.0);
        self
    }

    /// Limits how many frames each projectile lives.
    #[must_use]
    pub fn with_lifetime(mut self, frames: u32) -> Self {
        self.lifetime = Some(frames.max(1));
        self
    }

    /// Sets the on-hit side effect.
    #[must_use]
    pub fn with_hit_effect(mut self, effect: HitEffect) -> Self {
        self.on_hit = effect;
        self
    }

    /// Sets the area outside of which projectiles are culled.
    #[must_use]
    pub fn with_bounds(mut self, bounds: WorldBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Projectile speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// On-hit side effect.
    #[must_use]
    pub const fn hit_effect(&self) -> HitEffect {
        self.on_hit
    }

    /// Launches a projectile from an explicit point.
    pub fn spawn_at(&mut self, owner: EntityId, x: f32, y: f32, facing_right: bool) {
        let dir = if facing_right { 1.0 } else { -1.0 };
        self.live.push(Projectile {
            x,
            y,
            vx: self.speed * dir,
            vy: 0.0,
            damage: self.state.damage(),
            radius: self.radius,
            ttl: self.lifetime,
            owner,
        });
    }
}

impl Attack for ProjectileAttack {
    fn kind(&self) -> AttackKind {
        AttackKind::Projectile
    }

    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    /// Spawns one projectile. Hits are resolved later by
    /// [`HasProjectiles::check_collisions`], so this always reports zero.
    fn apply(&mut self, origin: &AttackOrigin, _targets: &mut [&mut dyn Damageable]) -> usize {
        let (_, cy) = origin.center();
        self.spawn_at(origin.id, origin.leading_edge() as f32, cy, origin.facing_right);
        0
    }

    fn update(&mut self) {
        self.state.tick();
        let bounds = self.bounds;
        self.live.retain_mut(|p| p.advance(&bounds));
    }

    fn reset(&mut self) {
        self.state.reset();
        self.clear_projectiles();
    }

    fn visuals(&self, _origin: &AttackOrigin, out: &mut Vec<AttackVisual>) {
        for projectile in &self.live {
            out.push(AttackVisual::Projectile {
                attack: self.state.name().to_string(),
                circle: projectile.circle(),
            });
        }
    }

    fn as_projectiles(&mut self) -> Option<&mut dyn HasProjectiles> {
        Some(self)
    }
}

impl HasProjectiles for ProjectileAttack {
    fn projectiles(&self) -> &[Projectile] {
        &self.live
    }

    fn check_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        let on_hit = self.on_hit;
        let mut hits = 0;

        self.live.retain(|projectile| {
            let circle = projectile.circle();
            let victim = targets.iter_mut().find(|t| {
                is_opponent(projectile.owner, &***t) && circle.intersects_rect(&t.bounds())
            });
            match victim {
                Some(target) => {
                    target.take_damage(projectile.damage);
                    on_hit.apply(&mut **target, projectile.vx.signum());
                    hits += 1;
                    false
                }
                None => true,
            }
        });
        hits
    }

    fn clear_projectiles(&mut self) {
        self.live.clear();
    }
}
