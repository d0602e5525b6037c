//! Melee swing.

use brawl_common::Rect;

use super::{is_opponent, Attack, AttackKind, AttackOrigin, AttackState, AttackVisual, Damageable};

/// Rectangular swing placed at the attacker's leading edge.
///
/// The hitbox is `range` wide and spans the attacker's height unless a
/// custom height is set. Each activation hits every overlapping target once.
#[derive(Debug, Clone)]
pub struct MeleeAttack {
    state: AttackState,
    range: i32,
    height: Option<i32>,
    knockback: f32,
}

impl MeleeAttack {
    /// Creates a melee attack.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: i32, cooldown: u32, range: i32) -> Self {
        Self {
            state: AttackState::new(name, damage, cooldown, 10),
            range: range.max(1),
            height: None,
            knockback: 0.0,
        }
    }

    /// Sets how long the hitbox stays visible.
    #[must_use]
    pub fn with_active_frames(mut self, frames: u32) -> Self {
        self.state = self.state.with_active_frames(frames);
        self
    }

    /// Sets a fixed hitbox height, centered on the attacker.
    #[must_use]
    pub fn with_height(mut self, height: i32) -> Self {
        self.height = Some(height.max(1));
        self
    }

    /// Shoves hit targets away from the attacker.
    #[must_use]
    pub fn with_knockback(mut self, force: f32) -> Self {
        self.knockback = force;
        self
    }

    /// Horizontal reach.
    #[must_use]
    pub const fn range(&self) -> i32 {
        self.range
    }

    /// Computes the hitbox for an attacker snapshot.
    #[must_use]
    pub fn hitbox(&self, origin: &AttackOrigin) -> Rect {
        let owner = origin.bounds;
        let height = self.height.unwrap_or(owner.h);
        let y = owner.y + (owner.h - height) / 2;
        let x = if origin.facing_right {
            owner.right()
        } else {
            owner.x - self.range
        };
        Rect::new(x, y, self.range, height)
    }
}

impl Attack for MeleeAttack {
    fn kind(&self) -> AttackKind {
        AttackKind::Melee
    }

    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    fn apply(&mut self, origin: &AttackOrigin, targets: &mut [&mut dyn Damageable]) -> usize {
        let hitbox = self.hitbox(origin);
        let damage = self.state.damage();
        let mut hits = 0;

        for target in targets.iter_mut() {
            if !is_opponent(origin.id, &**target) || !hitbox.intersects(&target.bounds()) {
                continue;
            }
            target.take_damage(damage);
            if self.knockback != 0.0 {
                target.push_back(self.knockback * origin.direction());
            }
            hits += 1;
        }
        hits
    }

    fn visuals(&self, origin: &AttackOrigin, out: &mut Vec<AttackVisual>) {
        if self.state.is_active() {
            out.push(AttackVisual::Hitbox {
                attack: self.state.name().to_string(),
                rect: self.hitbox(origin),
            });
        }
    }
}
