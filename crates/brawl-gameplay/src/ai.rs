//! Boss decision making.
//!
//! Strategies are pure per-frame functions: given the boss, its target and
//! the platforms, [`AiBehavior::decide`] recomputes an [`Intent`] from
//! distance thresholds. Nothing carries over between frames except what the
//! caller keeps (the RNG). Jump and drop-through choices draw one roll in
//! `0..100` per frame and compare it with a percentage.

use brawl_common::{horizontal_distance, Rect};
use serde::{Deserialize, Serialize};

use crate::physics::WorldBounds;
use crate::platform::Platform;

/// Horizontal movement intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    /// Stand still
    #[default]
    Stop,
    /// Walk left
    Left,
    /// Walk right
    Right,
}

/// Attack the strategy wants this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackChoice {
    /// Primary melee
    Melee,
    /// Primary ranged
    Ranged,
}

/// Everything a strategy decided for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intent {
    /// Horizontal movement
    pub movement: MoveIntent,
    /// Multiplier on move speed
    pub speed_scale: f32,
    /// X position to face after moving
    pub face: Option<f32>,
    /// Jump this frame
    pub jump: bool,
    /// Drop through the platform underfoot
    pub drop_through: bool,
    /// Attack to start
    pub attack: Option<AttackChoice>,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            movement: MoveIntent::Stop,
            speed_scale: 1.0,
            face: None,
            jump: false,
            drop_through: false,
            attack: None,
        }
    }
}

/// What a strategy sees.
#[derive(Debug, Clone, Copy)]
pub struct AiContext<'a> {
    /// Own bounds
    pub bounds: Rect,
    /// Own support state
    pub on_ground: bool,
    /// Primary melee off cooldown
    pub melee_ready: bool,
    /// Primary ranged off cooldown
    pub ranged_ready: bool,
    /// Target bounds
    pub target: Rect,
    /// Stage platforms in collision order
    pub platforms: &'a [Platform],
    /// World extent
    pub world: WorldBounds,
}

impl AiContext<'_> {
    /// Horizontal center distance to the target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        horizontal_distance(&self.bounds, &self.target)
    }

    /// Movement that closes the gap.
    #[must_use]
    pub fn toward(&self) -> MoveIntent {
        if self.target.center_x() >= self.bounds.center_x() {
            MoveIntent::Right
        } else {
            MoveIntent::Left
        }
    }

    /// Movement that opens the gap.
    #[must_use]
    pub fn away(&self) -> MoveIntent {
        match self.toward() {
            MoveIntent::Right => MoveIntent::Left,
            _ => MoveIntent::Right,
        }
    }

    /// Checks whether a move would push into the world edge.
    #[must_use]
    pub fn is_cornered(&self, movement: MoveIntent) -> bool {
        match movement {
            MoveIntent::Left => self.bounds.x <= 0,
            MoveIntent::Right => self.bounds.right() >= self.world.width,
            MoveIntent::Stop => false,
        }
    }

    /// Target stands clearly above.
    #[must_use]
    pub fn target_above(&self) -> bool {
        self.target.bottom() < self.bounds.y
    }

    /// Target stands clearly below.
    #[must_use]
    pub fn target_below(&self) -> bool {
        self.target.y > self.bounds.bottom()
    }

    /// Supported by a platform that drop-through can leave.
    #[must_use]
    pub fn on_pass_through_platform(&self) -> bool {
        self.on_ground
            && self.platforms.iter().any(|p| {
                p.is_active()
                    && !p.is_ground()
                    && p.surface_y() == self.bounds.bottom()
                    && p.bounds().overlaps_horizontally(&self.bounds)
            })
    }
}

/// Rolls the per-frame jump and drop-through chances.
fn vertical_intent(ctx: &AiContext<'_>, jump_chance: u32, drop_chance: u32, rng: &mut fastrand::Rng, intent: &mut Intent) {
    let roll = rng.u32(0..100);
    if ctx.on_ground && ctx.target_above() && roll < jump_chance {
        intent.jump = true;
    } else if ctx.on_pass_through_platform() && ctx.target_below() && roll < drop_chance {
        intent.drop_through = true;
    }
}

/// Tuning for [`AiBehavior::Aggressive`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggressiveTuning {
    /// Gap closed at full speed
    pub preferred_distance: f32,
    /// Gap at which the boss stops pressing
    pub contact_distance: f32,
    /// Speed scale while pressing inside the preferred distance
    pub press_speed: f32,
    /// Melee when the gap is at most this
    pub melee_range: f32,
    /// Ranged when the gap is at most this
    pub ranged_range: f32,
    /// Percent chance per frame to jump toward a higher target
    pub jump_chance: u32,
    /// Percent chance per frame to drop toward a lower target
    pub drop_chance: u32,
}

impl Default for AggressiveTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 100.0,
            contact_distance: 20.0,
            press_speed: 0.6,
            melee_range: 90.0,
            ranged_range: 400.0,
            jump_chance: 10,
            drop_chance: 10,
        }
    }
}

/// Tuning for [`AiBehavior::Defensive`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefensiveTuning {
    /// Gap the boss tries to keep
    pub preferred_distance: f32,
    /// Dead zone around the preferred distance
    pub tolerance: f32,
    /// Melee when the gap is at most this
    pub melee_range: f32,
    /// Ranged when the gap is at most this
    pub ranged_range: f32,
    /// Percent chance per frame to jump toward a higher target
    pub jump_chance: u32,
    /// Percent chance per frame to drop toward a lower target
    pub drop_chance: u32,
}

impl Default for DefensiveTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 300.0,
            tolerance: 40.0,
            melee_range: 80.0,
            ranged_range: 600.0,
            jump_chance: 5,
            drop_chance: 5,
        }
    }
}

/// Tuning for [`AiBehavior::Duelist`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelistTuning {
    /// Walk until the gap is at most this
    pub preferred_distance: f32,
    /// Melee band lower edge
    pub melee_min: f32,
    /// Melee band upper edge
    pub melee_max: f32,
    /// Percent chance per frame to jump toward a higher target
    pub jump_chance: u32,
    /// Percent chance per frame to drop toward a lower target
    pub drop_chance: u32,
}

impl Default for DuelistTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 70.0,
            melee_min: 0.0,
            melee_max: 110.0,
            jump_chance: 15,
            drop_chance: 15,
        }
    }
}

/// Tuning for [`AiBehavior::Artillery`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtilleryTuning {
    /// Speed scale while backing off
    pub retreat_speed: f32,
    /// Percent chance per frame to jump toward a higher target
    pub jump_chance: u32,
    /// Percent chance per frame to drop toward a lower target
    pub drop_chance: u32,
}

impl Default for ArtilleryTuning {
    fn default() -> Self {
        Self {
            retreat_speed: 0.8,
            jump_chance: 5,
            drop_chance: 20,
        }
    }
}

/// Boss strategy, selected per character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AiBehavior {
    /// Closes in and keeps pressing, melee up close, ranged at mid range
    Aggressive(AggressiveTuning),
    /// Holds a gap, backing off when crowded
    Defensive(DefensiveTuning),
    /// Walks to a fixed distance, then melees inside a band
    Duelist(DuelistTuning),
    /// Always backs away and always shoots
    Artillery(ArtilleryTuning),
}

impl Default for AiBehavior {
    fn default() -> Self {
        Self::Aggressive(AggressiveTuning::default())
    }
}

impl AiBehavior {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Aggressive(_) => "aggressive",
            Self::Defensive(_) => "defensive",
            Self::Duelist(_) => "duelist",
            Self::Artillery(_) => "artillery",
        }
    }

    /// Decides this frame's intent.
    pub fn decide(&self, ctx: &AiContext<'_>, rng: &mut fastrand::Rng) -> Intent {
        match self {
            Self::Aggressive(t) => aggressive(t, ctx, rng),
            Self::Defensive(t) => defensive(t, ctx, rng),
            Self::Duelist(t) => duelist(t, ctx, rng),
            Self::Artillery(t) => artillery(t, ctx, rng),
        }
    }
}

fn aggressive(t: &AggressiveTuning, ctx: &AiContext<'_>, rng: &mut fastrand::Rng) -> Intent {
    let dist = ctx.distance();
    let mut intent = Intent::default();

    if dist > t.preferred_distance {
        intent.movement = ctx.toward();
    } else if dist > t.contact_distance {
        intent.movement = ctx.toward();
        intent.speed_scale = t.press_speed;
    } else {
        intent.face = Some(ctx.target.center_x());
    }

    if dist <= t.melee_range && ctx.melee_ready {
        intent.attack = Some(AttackChoice::Melee);
    } else if dist <= t.ranged_range && ctx.ranged_ready {
        intent.attack = Some(AttackChoice::Ranged);
    }

    vertical_intent(ctx, t.jump_chance, t.drop_chance, rng, &mut intent);
    intent
}

fn defensive(t: &DefensiveTuning, ctx: &AiContext<'_>, rng: &mut fastrand::Rng) -> Intent {
    let dist = ctx.distance();
    let mut intent = Intent::default();

    if dist < t.preferred_distance - t.tolerance {
        let away = ctx.away();
        if ctx.is_cornered(away) {
            intent.face = Some(ctx.target.center_x());
            intent.jump = ctx.on_ground;
        } else {
            intent.movement = away;
        }
    } else if dist > t.preferred_distance + t.tolerance {
        intent.movement = ctx.toward();
    } else {
        intent.face = Some(ctx.target.center_x());
    }

    if dist <= t.melee_range && ctx.melee_ready {
        intent.face = Some(ctx.target.center_x());
        intent.attack = Some(AttackChoice::Melee);
    } else if dist <= t.ranged_range && ctx.ranged_ready {
        intent.face = Some(ctx.target.center_x());
        intent.attack = Some(AttackChoice::Ranged);
    }

    if !intent.jump {
        vertical_intent(ctx, t.jump_chance, t.drop_chance, rng, &mut intent);
    }
    intent
}

fn duelist(t: &DuelistTuning, ctx: &AiContext<'_>, rng: &mut fastrand::Rng) -> Intent {
    let dist = ctx.distance();
    let mut intent = Intent::default();

    if dist > t.preferred_distance {
        intent.movement = ctx.toward();
    } else {
        intent.face = Some(ctx.target.center_x());
    }

    if (t.melee_min..=t.melee_max).contains(&dist) && ctx.melee_ready {
        intent.attack = Some(AttackChoice::Melee);
    }

    vertical_intent(ctx, t.jump_chance, t.drop_chance, rng, &mut intent);
    intent
}

fn artillery(t: &ArtilleryTuning, ctx: &AiContext<'_>, rng: &mut fastrand::Rng) -> Intent {
    let mut intent = Intent::default();

    let away = ctx.away();
    if !ctx.is_cornered(away) {
        intent.movement = away;
        intent.speed_scale = t.retreat_speed;
    }

    if ctx.ranged_ready {
        intent.face = Some(ctx.target.center_x());
        intent.attack = Some(AttackChoice::Ranged);
    }

    vertical_intent(ctx, t.jump_chance, t.drop_chance, rng, &mut intent);
    intent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(me_x: i32, target_x: i32) -> AiContext<'static> {
        AiContext {
            bounds: Rect::new(me_x, 440, 40, 60),
            on_ground: true,
            melee_ready: true,
            ranged_ready: true,
            target: Rect::new(target_x, 440, 40, 60),
            platforms: &[],
            world: WorldBounds::new(1000, 500),
        }
    }

    fn no_chance() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    #[test]
    fn test_aggressive_presses_inside_preferred_distance() {
        let ai = AiBehavior::Aggressive(AggressiveTuning::default());
        let intent = ai.decide(&ctx(100, 150), &mut no_chance());
        assert_eq!(intent.movement, MoveIntent::Right);
        assert!(intent.speed_scale < 1.0);
        assert_eq!(intent.attack, Some(AttackChoice::Melee));
    }

    #[test]
    fn test_aggressive_full_speed_from_afar() {
        let ai = AiBehavior::Aggressive(AggressiveTuning::default());
        let intent = ai.decide(&ctx(600, 100), &mut no_chance());
        assert_eq!(intent.movement, MoveIntent::Left);
        assert_eq!(intent.speed_scale, 1.0);
        assert_eq!(intent.attack, None);
    }

    #[test]
    fn test_aggressive_stops_at_contact() {
        let ai = AiBehavior::Aggressive(AggressiveTuning::default());
        let intent = ai.decide(&ctx(100, 110), &mut no_chance());
        assert_eq!(intent.movement, MoveIntent::Stop);
        assert_eq!(intent.face, Some(130.0));
    }

    #[test]
    fn test_defensive_backs_off_and_jumps_when_cornered() {
        let ai = AiBehavior::Defensive(DefensiveTuning::default());
        let intent = ai.decide(&ctx(400, 450), &mut no_chance());
        assert_eq!(intent.movement, MoveIntent::Left);

        let cornered = ai.decide(&ctx(0, 50), &mut no_chance());
        assert_eq!(cornered.movement, MoveIntent::Stop);
        assert!(cornered.jump);
    }

    #[test]
    fn test_defensive_holds_inside_tolerance() {
        let ai = AiBehavior::Defensive(DefensiveTuning::default());
        let intent = ai.decide(&ctx(100, 400), &mut no_chance());
        assert_eq!(intent.movement, MoveIntent::Stop);
        assert_eq!(intent.attack, Some(AttackChoice::Ranged));
    }

    #[test]
    fn test_duelist_only_melees_in_band() {
        let ai = AiBehavior::Duelist(DuelistTuning::default());
        let far = ai.decide(&ctx(100, 600), &mut no_chance());
        assert_eq!(far.movement, MoveIntent::Right);
        assert_eq!(far.attack, None);

        let near = ai.decide(&ctx(100, 160), &mut no_chance());
        assert_eq!(near.movement, MoveIntent::Stop);
        assert_eq!(near.attack, Some(AttackChoice::Melee));
    }

    #[test]
    fn test_artillery_retreats_and_shoots() {
        let ai = AiBehavior::Artillery(ArtilleryTuning::default());
        let intent = ai.decide(&ctx(500, 450), &mut no_chance());
        assert_eq!(intent.movement, MoveIntent::Right);
        assert_eq!(intent.attack, Some(AttackChoice::Ranged));
        assert_eq!(intent.face, Some(470.0));

        let mut busy = ctx(960, 450);
        busy.ranged_ready = false;
        let cornered = ai.decide(&busy, &mut no_chance());
        assert_eq!(cornered.movement, MoveIntent::Stop);
        assert_eq!(cornered.attack, None);
    }

    #[test]
    fn test_jump_chance_is_a_percentage() {
        let always = AggressiveTuning {
            jump_chance: 100,
            ..AggressiveTuning::default()
        };
        let never = AggressiveTuning {
            jump_chance: 0,
            ..AggressiveTuning::default()
        };
        let mut above = ctx(100, 500);
        above.target.y = 200;

        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..50 {
            assert!(AiBehavior::Aggressive(always).decide(&above, &mut rng).jump);
            assert!(!AiBehavior::Aggressive(never).decide(&above, &mut rng).jump);
        }
    }

    #[test]
    fn test_drop_needs_pass_through_platform() {
        let tuning = DuelistTuning {
            drop_chance: 100,
            ..DuelistTuning::default()
        };
        let platforms = [Platform::new(0, 300, 400, 20)];
        let mut on_ledge = ctx(100, 600);
        on_ledge.bounds.y = 240;
        on_ledge.platforms = &platforms;
        let mut rng = fastrand::Rng::with_seed(3);
        assert!(AiBehavior::Duelist(tuning).decide(&on_ledge, &mut rng).drop_through);

        let mut on_floor = ctx(100, 600);
        on_floor.target.y = 700;
        assert!(!AiBehavior::Duelist(tuning).decide(&on_floor, &mut rng).drop_through);
    }
}
