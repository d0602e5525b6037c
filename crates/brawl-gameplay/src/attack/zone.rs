//! Lingering pull zone.

use brawl_common::{Circle, EntityId};

use super::{
    is_opponent, Attack, AttackKind, AttackOrigin, AttackState, AttackVisual, Damageable,
    LingeringHazard,
};

/// Zone that drags opponents toward its center and deals damage on a fixed
/// interval.
///
/// The pull is applied every resolved frame. Damage uses a frame counter
/// that resets each time it reaches `tick_interval`, so a target standing in
/// the zone is hurt once per interval.
#[derive(Debug, Clone)]
pub struct PullZone {
    state: AttackState,
    radius: f32,
    pull_force: f32,
    tick_interval: u32,
    duration: u32,
    offset: f32,
    center: (f32, f32),
    remaining: u32,
    frame_counter: u32,
    owner: EntityId,
}

impl PullZone {
    /// Creates a pull zone.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        damage: i32,
        cooldown: u32,
        radius: f32,
        pull_force: f32,
        tick_interval: u32,
        duration: u32,
    ) -> Self {
        Self {
            state: AttackState::new(name, damage, cooldown, duration),
            radius: radius.max(1.0),
            pull_force: pull_force.abs(),
            tick_interval: tick_interval.max(1),
            duration,
            offset: 0.0,
            center: (0.0, 0.0),
            remaining: 0,
            frame_counter: 0,
            owner: EntityId::NULL,
        }
    }

    /// Places the zone this far in front of the attacker instead of on it.
    #[must_use]
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// Zone circle.
    #[must_use]
    pub fn circle(&self) -> Circle {
        Circle::new(self.center.0, self.center.1, self.radius)
    }

    /// Frames the zone has left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Opens the zone at a point.
    pub fn activate_at(&mut self, owner: EntityId, x: f32, y: f32) {
        self.owner = owner;
        self.center = (x, y);
        self.remaining = self.duration;
        self.frame_counter = 0;
    }
}

impl Attack for PullZone {
    fn kind(&self) -> AttackKind {
        AttackKind::PullZone
    }

    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    fn apply(&mut self, origin: &AttackOrigin, _targets: &mut [&mut dyn Damageable]) -> usize {
        let (cx, cy) = origin.center();
        self.activate_at(origin.id, cx + self.offset * origin.direction(), cy);
        0
    }

    fn reset(&mut self) {
        self.state.reset();
        self.remaining = 0;
        self.frame_counter = 0;
    }

    fn visuals(&self, _origin: &AttackOrigin, out: &mut Vec<AttackVisual>) {
        if self.remaining > 0 {
            out.push(AttackVisual::Zone {
                attack: self.state.name().to_string(),
                circle: self.circle(),
            });
        }
    }

    fn as_hazard(&mut self) -> Option<&mut dyn LingeringHazard> {
        Some(self)
    }
}

impl LingeringHazard for PullZone {
    fn is_live(&self) -> bool {
        self.remaining > 0
    }

    fn resolve(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        if self.remaining == 0 {
            return 0;
        }
        let circle = self.circle();

        self.frame_counter += 1;
        let damage_tick = self.frame_counter >= self.tick_interval;
        if damage_tick {
            self.frame_counter = 0;
        }

        let mut hits = 0;
        for target in targets.iter_mut() {
            if !is_opponent(self.owner, &**target) || !circle.intersects_rect(&target.bounds()) {
                continue;
            }
            let dx = circle.x - target.bounds().center_x();
            if dx != 0.0 {
                target.push_back(dx.signum() * self.pull_force.min(dx.abs()));
            }
            if damage_tick {
                target.take_damage(self.state.damage());
                hits += 1;
            }
        }

        self.remaining -= 1;
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn vortex() -> PullZone {
        PullZone::new("vortex", 4, 120, 150.0, 3.0, 10, 60)
    }

    #[test]
    fn test_damage_once_per_interval() {
        let mut zone = vortex();
        let mut victim = Dummy::at(2, 200, 100);
        zone.activate_at(EntityId::from_raw(1), 120.0, 130.0);

        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];
        let mut total_hits = 0;
        for _ in 0..30 {
            total_hits += zone.resolve(&mut targets);
        }
        assert_eq!(total_hits, 3);
        assert_eq!(victim.health, 88);
    }

    #[test]
    fn test_pull_toward_center() {
        let mut zone = vortex();
        let mut right = Dummy::at(2, 200, 100);
        let mut left = Dummy::at(3, 20, 100);
        zone.activate_at(EntityId::from_raw(1), 120.0, 130.0);

        let mut targets: [&mut dyn Damageable; 2] = [&mut right, &mut left];
        zone.resolve(&mut targets);
        assert_eq!(right.pushed, -3.0);
        assert_eq!(left.pushed, 3.0);
    }

    #[test]
    fn test_pull_never_overshoots_center() {
        let mut zone = vortex();
        // Target center x = 121, one pixel right of the zone center
        let mut victim = Dummy::at(2, 101, 100);
        zone.activate_at(EntityId::from_raw(1), 120.0, 130.0);
        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];
        zone.resolve(&mut targets);
        assert_eq!(victim.pushed, -1.0);
    }

    #[test]
    fn test_expires_after_duration() {
        let mut zone = PullZone::new("vortex", 4, 120, 150.0, 3.0, 10, 5);
        zone.activate_at(EntityId::from_raw(1), 120.0, 130.0);
        let mut targets: [&mut dyn Damageable; 0] = [];
        for _ in 0..5 {
            assert!(zone.is_live());
            zone.resolve(&mut targets);
        }
        assert!(!zone.is_live());
    }

    #[test]
    fn test_execute_places_zone_in_front() {
        let mut zone = vortex().with_offset(100.0);
        let mut targets: [&mut dyn Damageable; 0] = [];
        assert!(zone.execute(&origin(), &mut targets));
        assert_eq!(zone.circle().x, 220.0);
        assert_eq!(zone.remaining(), 60);
    }
}
