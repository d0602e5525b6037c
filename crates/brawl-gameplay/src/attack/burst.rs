//! Screen-wide burst.

use serde::{Deserialize, Serialize};

use super::{is_opponent, Attack, AttackKind, AttackOrigin, AttackState, AttackVisual, Damageable};

/// What a global burst does to each opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstEffect {
    /// Stun only
    Stun {
        /// Stun duration in frames
        frames: u32,
    },
    /// Damage only
    Damage,
    /// Damage and stun
    StunAndDamage {
        /// Stun duration in frames
        frames: u32,
    },
    /// Halve movement speed
    Slow {
        /// Slow duration in frames
        frames: u32,
    },
}

/// Hits every opponent on the field at once, regardless of position.
#[derive(Debug, Clone)]
pub struct GlobalBurst {
    state: AttackState,
    effect: BurstEffect,
}

impl GlobalBurst {
    /// Creates a global burst.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: i32, cooldown: u32, effect: BurstEffect) -> Self {
        Self {
            state: AttackState::new(name, damage, cooldown, 15),
            effect,
        }
    }

    /// Effect applied to each opponent.
    #[must_use]
    pub const fn effect(&self) -> BurstEffect {
        self.effect
    }
}

impl Attack for GlobalBurst {
    fn kind(&self) -> AttackKind {
        AttackKind::GlobalBurst
    }

    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    fn apply(&mut self, origin: &AttackOrigin, targets: &mut [&mut dyn Damageable]) -> usize {
        let damage = self.state.damage();
        let mut hits = 0;

        for target in targets.iter_mut() {
            if !is_opponent(origin.id, &**target) {
                continue;
            }
            match self.effect {
                BurstEffect::Stun { frames } => target.stun(frames),
                BurstEffect::Damage => target.take_damage(damage),
                BurstEffect::StunAndDamage { frames } => {
                    target.take_damage(damage);
                    target.stun(frames);
                }
                BurstEffect::Slow { frames } => target.slow(frames),
            }
            hits += 1;
        }
        hits
    }

    fn visuals(&self, _origin: &AttackOrigin, out: &mut Vec<AttackVisual>) {
        if self.state.is_active() {
            out.push(AttackVisual::Flash {
                attack: self.state.name().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_hits_everyone_but_owner() {
        let mut burst = GlobalBurst::new("roar", 10, 300, BurstEffect::StunAndDamage { frames: 45 });
        let mut owner = Dummy::at(1, 100, 100);
        let mut a = Dummy::at(2, 900, 100);
        let mut b = Dummy::at(3, 10, 600);
        let mut targets: [&mut dyn Damageable; 3] = [&mut owner, &mut a, &mut b];

        assert_eq!(burst.apply(&origin(), &mut targets), 2);
        assert_eq!(owner.health, 100);
        assert_eq!((a.health, a.stun_frames), (90, 45));
        assert_eq!((b.health, b.stun_frames), (90, 45));
    }

    #[test]
    fn test_stun_only_deals_no_damage() {
        let mut burst = GlobalBurst::new("shout", 10, 300, BurstEffect::Stun { frames: 20 });
        let mut victim = Dummy::at(2, 900, 100);
        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];
        burst.apply(&origin(), &mut targets);
        assert_eq!((victim.health, victim.stun_frames), (100, 20));
    }

    #[test]
    fn test_slow() {
        let mut burst = GlobalBurst::new("frost", 0, 300, BurstEffect::Slow { frames: 90 });
        let mut victim = Dummy::at(2, 900, 100);
        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];
        burst.apply(&origin(), &mut targets);
        assert_eq!(victim.slow_frames, 90);
    }

    #[test]
    fn test_dead_targets_are_skipped() {
        let mut burst = GlobalBurst::new("roar", 10, 300, BurstEffect::Damage);
        let mut corpse = Dummy::at(2, 900, 100);
        corpse.health = 0;
        let mut targets: [&mut dyn Damageable; 1] = [&mut corpse];
        assert_eq!(burst.apply(&origin(), &mut targets), 0);
    }
}
