//! Telegraphed lane strike.

use brawl_common::{EntityId, Rect};
use serde::{Deserialize, Serialize};

use super::{
    is_opponent, Attack, AttackKind, AttackOrigin, AttackState, AttackVisual, Damageable,
    LingeringHazard,
};
use crate::physics::WorldBounds;

/// Phase of a targeted strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrikePhase {
    /// Not armed
    #[default]
    Idle,
    /// Telegraph only, no damage
    Windup,
    /// Lane deals damage
    Strike,
}

/// Vertical lane attack with a windup telegraph.
///
/// Only the strike phase hits, and each target at most once per arming.
/// The lane can be aimed at a fighter or at any x position, which is how
/// bosses lay down several strikes at once.
#[derive(Debug, Clone)]
pub struct TargetedStrike {
    state: AttackState,
    windup_frames: u32,
    strike_frames: u32,
    lane_width: i32,
    bounds: WorldBounds,
    phase: StrikePhase,
    phase_timer: u32,
    target_x: f32,
    owner: EntityId,
    already_hit: Vec<EntityId>,
}

impl TargetedStrike {
    /// Creates a targeted strike.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        damage: i32,
        cooldown: u32,
        windup_frames: u32,
        strike_frames: u32,
    ) -> Self {
        Self {
            state: AttackState::new(name, damage, cooldown, windup_frames + strike_frames),
            windup_frames,
            strike_frames: strike_frames.max(1),
            lane_width: 60,
            bounds: WorldBounds::default(),
            phase: StrikePhase::Idle,
            phase_timer: 0,
            target_x: 0.0,
            owner: EntityId::NULL,
            already_hit: Vec::new(),
        }
    }

    /// Sets the lane width.
    #[must_use]
    pub fn with_lane_width(mut self, width: i32) -> Self {
        self.lane_width = width.max(1);
        self
    }

    /// Sets the world the lane spans vertically.
    #[must_use]
    pub fn with_bounds(mut self, bounds: WorldBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> StrikePhase {
        self.phase
    }

    /// X coordinate the lane is centered on.
    #[must_use]
    pub const fn target_x(&self) -> f32 {
        self.target_x
    }

    /// Lane rectangle, spanning the full world height.
    #[must_use]
    pub fn lane(&self) -> Rect {
        let x = (self.target_x - self.lane_width as f32 / 2.0).round() as i32;
        Rect::new(x, 0, self.lane_width, self.bounds.floor)
    }

    /// Starts the windup over an x position. Ignores the cooldown.
    pub fn arm(&mut self, owner: EntityId, x: f32) {
        self.owner = owner;
        self.target_x = x;
        self.already_hit.clear();
        if self.windup_frames == 0 {
            self.phase = StrikePhase::Strike;
            self.phase_timer = self.strike_frames;
        } else {
            self.phase = StrikePhase::Windup;
            self.phase_timer = self.windup_frames;
        }
    }

    /// Starts the windup over a fighter's current position.
    pub fn arm_on(&mut self, owner: EntityId, target: &dyn Damageable) {
        self.arm(owner, target.bounds().center_x());
    }

    fn advance_phase(&mut self) {
        if self.phase == StrikePhase::Idle {
            return;
        }
        self.phase_timer = self.phase_timer.saturating_sub(1);
        if self.phase_timer > 0 {
            return;
        }
        match self.phase {
            StrikePhase::Windup => {
                self.phase = StrikePhase::Strike;
                self.phase_timer = self.strike_frames;
            }
            StrikePhase::Strike | StrikePhase::Idle => {
                self.phase = StrikePhase::Idle;
                self.already_hit.clear();
            }
        }
    }
}

impl Attack for TargetedStrike {
    fn kind(&self) -> AttackKind {
        AttackKind::TargetedStrike
    }

    fn state(&self) -> &AttackState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AttackState {
        &mut self.state
    }

    /// Aims at the closest opponent, or under the attacker if there is none.
    fn apply(&mut self, origin: &AttackOrigin, targets: &mut [&mut dyn Damageable]) -> usize {
        let (x, _) = origin
            .nearest_target(targets)
            .unwrap_or_else(|| origin.center());
        self.arm(origin.id, x);
        0
    }

    fn update(&mut self) {
        self.state.tick();
        self.advance_phase();
    }

    fn reset(&mut self) {
        self.state.reset();
        self.phase = StrikePhase::Idle;
        self.phase_timer = 0;
        self.already_hit.clear();
    }

    fn visuals(&self, _origin: &AttackOrigin, out: &mut Vec<AttackVisual>) {
        if self.phase != StrikePhase::Idle {
            out.push(AttackVisual::StrikeLane {
                attack: self.state.name().to_string(),
                rect: self.lane(),
                striking: self.phase == StrikePhase::Strike,
            });
        }
    }

    fn as_hazard(&mut self) -> Option<&mut dyn LingeringHazard> {
        Some(self)
    }
}

impl LingeringHazard for TargetedStrike {
    fn is_live(&self) -> bool {
        self.phase != StrikePhase::Idle
    }

    fn resolve(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        if self.phase != StrikePhase::Strike {
            return 0;
        }
        let lane = self.lane();
        let damage = self.state.damage();
        let mut hits = 0;

        for target in targets.iter_mut() {
            let id = target.id();
            if !is_opponent(self.owner, &**target)
                || self.already_hit.contains(&id)
                || !lane.intersects(&target.bounds())
            {
                continue;
            }
            target.take_damage(damage);
            self.already_hit.push(id);
            hits += 1;
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn lightning() -> TargetedStrike {
        TargetedStrike::new("lightning", 20, 90, 3, 2).with_lane_width(40)
    }

    #[test]
    fn test_phases_advance_on_update() {
        let mut strike = lightning();
        strike.arm(EntityId::from_raw(1), 300.0);
        assert_eq!(strike.phase(), StrikePhase::Windup);

        strike.update();
        strike.update();
        assert_eq!(strike.phase(), StrikePhase::Windup);
        strike.update();
        assert_eq!(strike.phase(), StrikePhase::Strike);
        strike.update();
        assert_eq!(strike.phase(), StrikePhase::Strike);
        strike.update();
        assert_eq!(strike.phase(), StrikePhase::Idle);
    }

    #[test]
    fn test_windup_never_damages() {
        let mut strike = lightning();
        let mut victim = Dummy::at(2, 280, 100);
        strike.arm(EntityId::from_raw(1), 300.0);
        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];
        assert_eq!(strike.resolve(&mut targets), 0);
        assert_eq!(victim.health, 100);
    }

    #[test]
    fn test_strike_hits_each_target_once() {
        let mut strike = lightning();
        let mut victim = Dummy::at(2, 280, 100);
        let mut bystander = Dummy::at(3, 600, 100);
        strike.arm(EntityId::from_raw(1), 300.0);
        for _ in 0..3 {
            strike.update();
        }

        let mut targets: [&mut dyn Damageable; 2] = [&mut victim, &mut bystander];
        assert_eq!(strike.resolve(&mut targets), 1);
        strike.update();
        assert_eq!(strike.resolve(&mut targets), 0);

        assert_eq!(victim.health, 80);
        assert_eq!(bystander.health, 100);
    }

    #[test]
    fn test_execute_aims_at_nearest_target() {
        let mut strike = lightning();
        let mut near = Dummy::at(2, 300, 500);
        let mut far = Dummy::at(3, 900, 100);
        let mut targets: [&mut dyn Damageable; 2] = [&mut far, &mut near];
        assert!(strike.execute(&origin(), &mut targets));
        assert_eq!(strike.target_x(), 320.0);
        assert!(!strike.can_use());
    }

    #[test]
    fn test_zero_windup_strikes_immediately() {
        let mut strike = TargetedStrike::new("snap", 5, 0, 0, 1);
        strike.arm(EntityId::from_raw(1), 50.0);
        assert_eq!(strike.phase(), StrikePhase::Strike);
        assert!(strike.is_live());
    }
}
