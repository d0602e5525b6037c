//! Circular burst around the attacker.

use brawl_common::Circle;

use super::{is_opponent, Attack, AttackKind, AttackOrigin, AttackState, AttackVisual, Damageable};

/// Instant radial burst centered on the attacker.
///
/// Damage is dealt once at the moment of use. The ring then stays visible
/// for the active window without hitting again.
#[derive(Debug, Clone)]
pub struct AreaAttack {
    state: AttackState,
    radius: f32,
    launch: f32,
}

impl AreaAttack {
    /// Creates an area attack.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: i32, cooldown: u32, radius: f32) -> Self {
        Self {
            state: AttackState::new(name, damage, cooldown, 20),
            radius: radius.max(1.0),
            launch: 0.0,
        }
    }

    /// Sets how long the ring stays visible.
    #[must_use]
    pub fn with_active_frames(mut self, frames: u32) -> Self {
        self.state = self.state.with_active_frames(frames);
        self
    }

    /// Throws hit targets upward with the given speed.
    #[must_use]
    pub fn with_launch(mut self, speed: f32) -> Self {
        self.launch = speed.abs();
        self
    }

    /// Burst radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Burst circle for an attacker snapshot.
    #[must_use]
    pub fn circle(&self, origin: &AttackOrigin) -> Circle {
        let (cx, cy) = origin.center();
        Circle::new(cx, cy, self.radius)
    }
}

impl Attack for AreaAttack {
    fn kind(&self) -> AttackKind {
        AttackKind::Area
    }

    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    fn apply(&mut self, origin: &AttackOrigin, targets: &mut [&mut dyn Damageable]) -> usize {
        let circle = self.circle(origin);
        let damage = self.state.damage();
        let mut hits = 0;

        for target in targets.iter_mut() {
            if !is_opponent(origin.id, &**target) || !circle.intersects_rect(&target.bounds()) {
                continue;
            }
            target.take_damage(damage);
            if self.launch > 0.0 {
                target.push_vertical(-self.launch);
            }
            hits += 1;
        }
        hits
    }

    fn visuals(&self, origin: &AttackOrigin, out: &mut Vec<AttackVisual>) {
        if self.state.is_active() {
            out.push(AttackVisual::Burst {
                attack: self.state.name().to_string(),
                circle: self.circle(origin),
            });
        }
    }
}
