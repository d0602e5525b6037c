//! AI-driven bosses.
//!
//! A boss is a [`Fighter`] plus a target, an [`AiBehavior`] that produces an
//! intent every frame, and a special-attack countdown that runs
//! independently of the behaviour.

use brawl_common::{EntityId, Rect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{AiBehavior, AiContext, AttackChoice, Intent, MoveIntent};
use crate::attack::{Attack, Damageable, LingeringHazard, TargetedStrike};
use crate::events::CombatEvent;
use crate::fighter::{AttackCapable, Fighter, Movable};
use crate::gate::AttackSlot;
use crate::platform::Platform;

/// A volley of lane strikes scattered around the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrageTuning {
    /// Name used in notifications
    pub name: String,
    /// Number of strikes per volley
    pub count: u32,
    /// Maximum horizontal offset from the target
    pub spread: f32,
    /// Damage per strike
    pub damage: i32,
    /// Telegraph frames
    pub windup_frames: u32,
    /// Damaging frames
    pub strike_frames: u32,
    /// Lane width in pixels
    pub lane_width: i32,
}

impl Default for BarrageTuning {
    fn default() -> Self {
        Self {
            name: "barrage".to_string(),
            count: 3,
            spread: 150.0,
            damage: 15,
            windup_frames: 45,
            strike_frames: 10,
            lane_width: 60,
        }
    }
}

/// How a boss spends its special.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpecialKind {
    /// Plays the attack bound to [`AttackSlot::Special`]
    Signature,
    /// Arms several independent strikes at randomized positions
    StrikeBarrage(BarrageTuning),
}

/// A registered attack the boss uses whenever a target is in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportMove {
    /// Registered attack name
    pub attack: String,
    /// Horizontal center distance at or under which it is used
    pub range: f32,
}

/// Boss-only tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Per-frame strategy
    pub behavior: AiBehavior,
    /// Special attack
    pub special: SpecialKind,
    /// Frames between specials
    pub special_interval: u32,
    /// Extra moves used off cooldown, outside the behaviour
    pub support: Vec<SupportMove>,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            behavior: AiBehavior::default(),
            special: SpecialKind::Signature,
            special_interval: 300,
            support: Vec::new(),
        }
    }
}

/// A computer-controlled fighter.
#[derive(Debug)]
pub struct Boss {
    fighter: Fighter,
    tuning: BossTuning,
    target: Option<EntityId>,
    special_timer: u32,
    strikes: Vec<TargetedStrike>,
    rng: fastrand::Rng,
}

impl Boss {
    /// Wraps a fighter. The first special becomes available after one full
    /// interval.
    #[must_use]
    pub fn new(fighter: Fighter, tuning: BossTuning, seed: u64) -> Self {
        let special_timer = tuning.special_interval.max(1);
        Self {
            fighter,
            tuning,
            target: None,
            special_timer,
            strikes: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// The underlying fighter.
    #[must_use]
    pub const fn fighter(&self) -> &Fighter {
        &self.fighter
    }

    /// The underlying fighter, mutable.
    pub fn fighter_mut(&mut self) -> &mut Fighter {
        &mut self.fighter
    }

    /// Boss tuning.
    #[must_use]
    pub const fn tuning(&self) -> &BossTuning {
        &self.tuning
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Changes the target.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Frames until the special is attempted.
    #[must_use]
    pub const fn special_timer(&self) -> u32 {
        self.special_timer
    }

    /// Barrage strikes still in windup or strike.
    #[must_use]
    pub fn strikes(&self) -> &[TargetedStrike] {
        &self.strikes
    }

    /// Decides and applies this frame's intents.
    ///
    /// `target` is the bounds of the current target, `targets` the snapshot
    /// handed to any attack started this frame. Runs before the physics
    /// update.
    pub fn think(&mut self, target: Option<Rect>, targets: &[EntityId], platforms: &[Platform]) {
        if !self.fighter.is_alive() {
            self.fighter.stop_moving();
            return;
        }
        let Some(target) = target else {
            self.fighter.stop_moving();
            return;
        };

        let manager = self.fighter.attacks();
        let ready = |name: Option<&str>| name.is_some_and(|n| manager.can_use(n));
        let ctx = AiContext {
            bounds: self.fighter.rect(),
            on_ground: self.fighter.is_on_ground(),
            melee_ready: ready(manager.primary_melee()),
            ranged_ready: ready(manager.primary_ranged()),
            target,
            platforms,
            world: self.fighter.world(),
        };
        let intent = self.tuning.behavior.decide(&ctx, &mut self.rng);
        let distance = ctx.distance();
        self.apply_intent(&intent, targets);

        for support in &self.tuning.support {
            if distance <= support.range {
                self.fighter.perform_named_attack(&support.attack, targets);
            }
        }

        self.special_timer = self.special_timer.saturating_sub(1);
        if self.special_timer == 0 && self.use_special(target, targets) {
            self.special_timer = self.tuning.special_interval.max(1);
        }
    }

    /// Pushes an intent into the fighter.
    pub fn apply_intent(&mut self, intent: &Intent, targets: &[EntityId]) {
        let fighter = &mut self.fighter;
        match intent.movement {
            MoveIntent::Left => fighter.move_left(intent.speed_scale),
            MoveIntent::Right => fighter.move_right(intent.speed_scale),
            MoveIntent::Stop => fighter.stop_moving(),
        }
        if let Some(x) = intent.face {
            fighter.face_towards(x);
        }
        if intent.jump {
            fighter.jump();
        }
        if intent.drop_through {
            fighter.drop_through_platform();
        }
        match intent.attack {
            Some(AttackChoice::Melee) => {
                fighter.perform_melee_attack(targets);
            }
            Some(AttackChoice::Ranged) => {
                fighter.perform_ranged_attack(targets);
            }
            None => {}
        }
    }

    /// Fires the special. Returns false if it could not start, in which case
    /// the countdown stays at zero and it is retried next frame.
    pub fn use_special(&mut self, target: Rect, targets: &[EntityId]) -> bool {
        if self.fighter.is_stunned() {
            return false;
        }
        let name = match &self.tuning.special {
            SpecialKind::Signature => {
                if !self.fighter.perform_special_attack(targets) {
                    return false;
                }
                self.fighter
                    .gate(AttackSlot::Special)
                    .map_or_else(String::new, |gate| gate.spec().attack.clone())
            }
            SpecialKind::StrikeBarrage(barrage) => {
                let owner = self.fighter.id();
                let world = self.fighter.world();
                let center = target.center_x();
                for _ in 0..barrage.count {
                    let offset = (self.rng.f32() * 2.0 - 1.0) * barrage.spread;
                    let x = (center + offset).clamp(0.0, world.width as f32);
                    let mut strike = TargetedStrike::new(
                        barrage.name.as_str(),
                        barrage.damage,
                        0,
                        barrage.windup_frames,
                        barrage.strike_frames,
                    )
                    .with_lane_width(barrage.lane_width)
                    .with_bounds(world);
                    strike.arm(owner, x);
                    self.strikes.push(strike);
                }
                barrage.name.clone()
            }
        };

        debug!("{} '{}' special '{}'", self.fighter.id(), self.fighter.name(), name);
        self.fighter.events().publish(CombatEvent::SpecialAttack {
            entity_id: self.fighter.id(),
            special: name,
        });
        true
    }

    /// Puts the boss back at a spawn point and restarts the special timer.
    pub fn reset(&mut self, x: i32, y: i32) {
        self.fighter.reset(x, y);
        self.strikes.clear();
        self.special_timer = self.tuning.special_interval.max(1);
    }
}

impl Movable for Boss {
    fn update(&mut self, platforms: &[Platform], gravity_mod: f32, speed_mod: f32) {
        self.fighter.update(platforms, gravity_mod, speed_mod);
        for strike in &mut self.strikes {
            strike.update();
        }
        self.strikes.retain(LingeringHazard::is_live);
    }

    fn move_left(&mut self, speed_mod: f32) {
        self.fighter.move_left(speed_mod);
    }

    fn move_right(&mut self, speed_mod: f32) {
        self.fighter.move_right(speed_mod);
    }

    fn stop_moving(&mut self) {
        self.fighter.stop_moving();
    }

    fn jump(&mut self) -> bool {
        self.fighter.jump()
    }

    fn drop_through_platform(&mut self) -> bool {
        self.fighter.drop_through_platform()
    }
}

impl Damageable for Boss {
    fn id(&self) -> EntityId {
        self.fighter.id()
    }

    fn bounds(&self) -> Rect {
        self.fighter.rect()
    }

    fn is_alive(&self) -> bool {
        self.fighter.is_alive()
    }

    fn take_damage(&mut self, amount: i32) {
        self.fighter.take_damage(amount);
    }

    fn stun(&mut self, frames: u32) {
        self.fighter.stun(frames);
    }

    fn slow(&mut self, frames: u32) {
        self.fighter.slow(frames);
    }

    fn push_back(&mut self, force: f32) {
        self.fighter.push_back(force);
    }

    fn push_vertical(&mut self, force: f32) {
        self.fighter.push_vertical(force);
    }
}

impl AttackCapable for Boss {
    fn perform_melee_attack(&mut self, targets: &[EntityId]) -> bool {
        self.fighter.perform_melee_attack(targets)
    }

    fn perform_ranged_attack(&mut self, targets: &[EntityId]) -> bool {
        self.fighter.perform_ranged_attack(targets)
    }

    fn check_attack_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        let mut hits = self.fighter.check_attack_collisions(targets);
        for strike in &mut self.strikes {
            hits += strike.resolve(targets);
        }
        hits
    }
}
