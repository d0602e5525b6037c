//! Fighters: the shared body, health, and attack pipeline of players and
//! bosses.
//!
//! A [`Fighter`] is composed rather than subclassed. Character differences
//! live in [`FighterStats`], the attacks registered in its
//! [`AttackManager`], the gates bound to its attack slots, and the clips its
//! [`Animator`] knows. Players and bosses wrap a fighter and only add the
//! source of intents.
//!
//! Per-frame order inside [`Movable::update`]:
//! 1. status timers (stun forces horizontal velocity to zero)
//! 2. integration, platform collision, world clamp
//! 3. attack cooldown/active ticks
//! 4. gate observation of the current animation frame
//! 5. animation advance and locomotion clip selection
//!
//! Effects released by gates are queued and applied in
//! [`AttackCapable::check_attack_collisions`], after every fighter moved.

use ahash::AHashMap;
use brawl_common::{EntityId, Rect, Team};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::Animator;
use crate::attack::{Attack, AttackKind, AttackOrigin, AttackVisual, Damageable};
use crate::attack_manager::AttackManager;
use crate::events::{CombatEvent, EventSender};
use crate::gate::{ActionGate, AttackSlot, GateSpec};
use crate::physics::{Body, PhysicsConfig, WorldBounds};
use crate::platform::Platform;

/// Clip played while standing still.
pub const CLIP_IDLE: &str = "idle";
/// Clip played while moving on the ground.
pub const CLIP_RUN: &str = "run";
/// Clip played while airborne.
pub const CLIP_JUMP: &str = "jump";

/// Moving and physics capability.
pub trait Movable {
    /// Runs one frame of the fighter pipeline.
    fn update(&mut self, platforms: &[Platform], gravity_mod: f32, speed_mod: f32);

    /// Sets leftward velocity. Ignored while stunned.
    fn move_left(&mut self, speed_mod: f32);

    /// Sets rightward velocity. Ignored while stunned.
    fn move_right(&mut self, speed_mod: f32);

    /// Zeroes horizontal velocity.
    fn stop_moving(&mut self);

    /// Jumps if supported and not stunned.
    fn jump(&mut self) -> bool;

    /// Drops through the platform underfoot if supported and not stunned.
    fn drop_through_platform(&mut self) -> bool;
}

/// Attacking capability.
pub trait AttackCapable {
    /// Starts the primary melee attack against a target snapshot.
    fn perform_melee_attack(&mut self, targets: &[EntityId]) -> bool;

    /// Starts the primary ranged attack against a target snapshot.
    fn perform_ranged_attack(&mut self, targets: &[EntityId]) -> bool;

    /// Applies queued effects, projectile hits, and lingering hazards.
    /// Returns the number of hits.
    fn check_attack_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize;
}

/// Everything the arena needs from a participant.
pub trait Combatant: Movable + Damageable + AttackCapable {}

impl<T: Movable + Damageable + AttackCapable> Combatant for T {}

/// Character tuning shared by players and bosses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterStats {
    /// Body width in pixels
    pub width: i32,
    /// Body height in pixels
    pub height: i32,
    /// Maximum health
    pub max_health: i32,
    /// Horizontal speed per frame
    pub move_speed: f32,
    /// Upward launch speed of a jump
    pub jump_strength: f32,
}

impl Default for FighterStats {
    fn default() -> Self {
        Self {
            width: 48,
            height: 72,
            max_health: 100,
            move_speed: 5.0,
            jump_strength: 12.0,
        }
    }
}

/// An effect waiting for the collision pass.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingEffect {
    attack: String,
    targets: Vec<EntityId>,
    /// Gate trigger that released it; `None` for a named use
    trigger: Option<usize>,
}

/// Serializable snapshot of a fighter for renderers and summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterView {
    /// Fighter ID
    pub id: EntityId,
    /// Character name
    pub name: String,
    /// Side
    pub team: Team,
    /// Bounds
    pub bounds: Rect,
    /// Current health
    pub health: i32,
    /// Maximum health
    pub max_health: i32,
    /// Facing right
    pub facing_right: bool,
    /// Supported by a platform or the floor
    pub on_ground: bool,
    /// Stunned
    pub stunned: bool,
    /// Current clip
    pub animation: Option<String>,
    /// Current clip frame
    pub frame: usize,
}

/// A fighter in a match.
#[derive(Debug)]
pub struct Fighter {
    id: EntityId,
    team: Team,
    name: String,
    body: Body,
    health: i32,
    max_health: i32,
    facing_right: bool,
    stun_timer: u32,
    slow_timer: u32,
    move_speed: f32,
    jump_strength: f32,
    attacks: AttackManager,
    gates: AHashMap<AttackSlot, ActionGate>,
    pending: Vec<PendingEffect>,
    animator: Box<dyn Animator>,
    events: EventSender,
    physics: PhysicsConfig,
    world: WorldBounds,
}

impl Fighter {
    /// Creates a fighter at a position with no attacks.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        team: Team,
        stats: &FighterStats,
        x: i32,
        y: i32,
        animator: Box<dyn Animator>,
    ) -> Self {
        let id = EntityId::new();
        let max_health = stats.max_health.max(1);
        Self {
            id,
            team,
            name: name.into(),
            body: Body::new(x, y, stats.width.max(1), stats.height.max(1)),
            health: max_health,
            max_health,
            facing_right: team == Team::Players,
            stun_timer: 0,
            slow_timer: 0,
            move_speed: stats.move_speed,
            jump_strength: stats.jump_strength,
            attacks: AttackManager::new(id),
            gates: AHashMap::new(),
            pending: Vec::new(),
            animator,
            events: EventSender::silent(),
            physics: PhysicsConfig::default(),
            world: WorldBounds::default(),
        }
    }

    /// Sets physics tuning and the world the fighter lives in.
    #[must_use]
    pub fn with_physics(mut self, physics: PhysicsConfig, world: WorldBounds) -> Self {
        self.physics = physics;
        self.world = world;
        self
    }

    /// Connects the fighter to a notification bus.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// Replaces the notification handle.
    pub fn set_events(&mut self, events: EventSender) {
        self.events = events;
    }

    /// Registers an attack.
    pub fn register_attack(&mut self, attack: Box<dyn Attack>) {
        self.attacks.register(attack);
    }

    /// Binds a registered attack to a slot, played through a clip.
    ///
    /// Melee and ranged slots also become the manager's primary shortcuts.
    /// Returns false if the attack is not registered.
    pub fn bind_gate(&mut self, slot: AttackSlot, spec: GateSpec) -> bool {
        let bound = match slot {
            AttackSlot::Melee => self.attacks.set_primary_melee(&spec.attack),
            AttackSlot::Ranged => self.attacks.set_primary_ranged(&spec.attack),
            AttackSlot::Special => self.attacks.contains(&spec.attack),
        };
        if bound {
            self.gates.insert(slot, ActionGate::new(spec));
        }
        bound
    }

    /// Fighter ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Side.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Character name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Left edge.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.body.rect.x
    }

    /// Top edge.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.body.rect.y
    }

    /// Width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.body.rect.w
    }

    /// Height.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.body.rect.h
    }

    /// Bounds.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.body.rect
    }

    /// Velocity as `(vx, vy)`.
    #[must_use]
    pub const fn velocity(&self) -> (f32, f32) {
        (self.body.vx, self.body.vy)
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Facing right.
    #[must_use]
    pub const fn facing_right(&self) -> bool {
        self.facing_right
    }

    /// Supported by a platform or the floor.
    #[must_use]
    pub const fn is_on_ground(&self) -> bool {
        self.body.is_on_ground()
    }

    /// Stunned.
    #[must_use]
    pub const fn is_stunned(&self) -> bool {
        self.stun_timer > 0
    }

    /// Remaining stun frames.
    #[must_use]
    pub const fn stun_timer(&self) -> u32 {
        self.stun_timer
    }

    /// Slowed.
    #[must_use]
    pub const fn is_slowed(&self) -> bool {
        self.slow_timer > 0
    }

    /// Falling through platforms.
    #[must_use]
    pub const fn is_dropping_through(&self) -> bool {
        self.body.is_dropping_through()
    }

    /// Base horizontal speed.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Physics tuning.
    #[must_use]
    pub const fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    /// World bounds.
    #[must_use]
    pub const fn world(&self) -> WorldBounds {
        self.world
    }

    /// Attack registry.
    #[must_use]
    pub const fn attacks(&self) -> &AttackManager {
        &self.attacks
    }

    /// Attack registry, mutable.
    pub fn attacks_mut(&mut self) -> &mut AttackManager {
        &mut self.attacks
    }

    /// Animation handle.
    #[must_use]
    pub fn animator(&self) -> &dyn Animator {
        self.animator.as_ref()
    }

    /// Gate bound to a slot.
    #[must_use]
    pub fn gate(&self, slot: AttackSlot) -> Option<&ActionGate> {
        self.gates.get(&slot)
    }

    /// Returns whether any gated attack is in progress.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.gates.values().any(ActionGate::is_busy)
    }

    /// Notification handle.
    #[must_use]
    pub const fn events(&self) -> &EventSender {
        &self.events
    }

    /// Attacker snapshot for applying effects.
    #[must_use]
    pub const fn origin(&self) -> AttackOrigin {
        AttackOrigin::new(self.id, self.body.rect, self.facing_right)
    }

    /// Turns toward an x position. Facing is locked while stunned or while
    /// a gated attack plays.
    pub fn face_towards(&mut self, x: f32) {
        if self.is_stunned() || self.is_attacking() {
            return;
        }
        let cx = self.body.rect.center_x();
        if x > cx {
            self.facing_right = true;
        } else if x < cx {
            self.facing_right = false;
        }
    }

    /// Restores health, never above the maximum.
    pub fn heal(&mut self, amount: i32) {
        if amount <= 0 || !self.is_alive() {
            return;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        if self.health > before {
            self.events.publish(CombatEvent::Healed {
                entity_id: self.id,
                amount: self.health - before,
            });
        }
    }

    /// Starts the gated attack bound to a slot.
    ///
    /// Refused while stunned, while the slot is busy, or while the attack
    /// cools down. The cooldown starts immediately. If the clip is missing
    /// the effects are queued at once.
    pub fn perform_attack(&mut self, slot: AttackSlot, targets: &[EntityId]) -> bool {
        if self.is_stunned() {
            return false;
        }
        let Some(gate) = self.gates.get_mut(&slot) else {
            return false;
        };
        if gate.is_busy() || !self.attacks.can_use(&gate.spec().attack) {
            return false;
        }

        let spec = gate.spec().clone();
        self.attacks.start(&spec.attack);

        if self.animator.has_animation(&spec.clip) {
            self.animator.set_animation_forced(&spec.clip);
            gate.begin(targets.to_vec());
        } else {
            for trigger in 0..spec.trigger_frames.len().max(1) {
                self.pending.push(PendingEffect {
                    attack: spec.attack.clone(),
                    targets: targets.to_vec(),
                    trigger: Some(trigger),
                });
            }
        }

        debug!("{} '{}' started {:?} '{}'", self.id, self.name, slot, spec.attack);
        self.events.publish(CombatEvent::AttackStarted {
            entity_id: self.id,
            attack: spec.attack,
        });
        true
    }

    /// Starts the special attack bound to [`AttackSlot::Special`].
    pub fn perform_special_attack(&mut self, targets: &[EntityId]) -> bool {
        self.perform_attack(AttackSlot::Special, targets)
    }

    /// Uses a registered attack by name, outside any animation gate.
    ///
    /// Refused while stunned, or when the attack is unknown, cooling down or
    /// already queued. The attack executes in the next collision pass.
    pub fn perform_named_attack(&mut self, name: &str, targets: &[EntityId]) -> bool {
        if self.is_stunned() || !self.attacks.can_use(name) {
            return false;
        }
        if self.pending.iter().any(|e| e.trigger.is_none() && e.attack == name) {
            return false;
        }
        self.pending.push(PendingEffect {
            attack: name.to_string(),
            targets: targets.to_vec(),
            trigger: None,
        });

        debug!("{} '{}' used '{}'", self.id, self.name, name);
        self.events.publish(CombatEvent::AttackStarted {
            entity_id: self.id,
            attack: name.to_string(),
        });
        true
    }

    /// Collects draw data for this fighter's attacks.
    #[must_use]
    pub fn draw_attacks(&self) -> Vec<AttackVisual> {
        self.attacks.draw_all(&self.origin())
    }

    /// Renderer/summary snapshot.
    #[must_use]
    pub fn view(&self) -> FighterView {
        FighterView {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            bounds: self.body.rect,
            health: self.health,
            max_health: self.max_health,
            facing_right: self.facing_right,
            on_ground: self.is_on_ground(),
            stunned: self.is_stunned(),
            animation: self.animator.current_animation().map(str::to_string),
            frame: self.animator.current_frame(),
        }
    }

    /// Puts the fighter back at a spawn point for a new round.
    ///
    /// Restores health and clears stun, slow, drop-through, cooldowns,
    /// projectiles, and any attack in progress.
    pub fn reset(&mut self, x: i32, y: i32) {
        self.health = self.max_health;
        self.stun_timer = 0;
        self.slow_timer = 0;
        self.body.place(x, y);
        self.attacks.reset_all();
        for gate in self.gates.values_mut() {
            gate.cancel();
        }
        self.pending.clear();
        self.animator.set_animation_forced(CLIP_IDLE);
    }

    fn tick_status(&mut self) {
        if self.stun_timer > 0 {
            self.body.vx = 0.0;
            self.stun_timer -= 1;
        }
        self.slow_timer = self.slow_timer.saturating_sub(1);
    }

    fn observe_gates(&mut self) {
        let frame = self.animator.current_frame();
        let complete = self.animator.is_animation_complete();
        let clip = self.animator.current_animation();

        for slot in AttackSlot::ALL {
            let Some(gate) = self.gates.get_mut(&slot) else {
                continue;
            };
            if !gate.is_busy() {
                continue;
            }
            let snapshot = gate.targets().to_vec();
            for trigger in gate.advance(clip, frame, complete) {
                let attack = gate.spec().attack.clone();
                trace!("{} gate {:?} trigger {} on frame {}", self.id, slot, trigger, frame);
                self.pending.push(PendingEffect {
                    attack,
                    targets: snapshot.clone(),
                    trigger: Some(trigger),
                });
            }
        }
    }

    fn select_locomotion_clip(&mut self) {
        if self.is_attacking() {
            return;
        }
        let clip = if !self.body.is_on_ground() {
            CLIP_JUMP
        } else if self.body.vx != 0.0 {
            CLIP_RUN
        } else {
            CLIP_IDLE
        };
        self.animator.set_animation(clip);
    }

    fn horizontal_speed(&self, speed_mod: f32) -> f32 {
        let slow = if self.is_slowed() { 0.5 } else { 1.0 };
        self.move_speed * speed_mod * slow
    }
}

impl Movable for Fighter {
    fn update(&mut self, platforms: &[Platform], gravity_mod: f32, speed_mod: f32) {
        self.tick_status();
        self.body
            .step(platforms, &self.physics, &self.world, gravity_mod, speed_mod);
        self.attacks.update_all();
        self.observe_gates();
        self.animator.advance();
        self.select_locomotion_clip();
    }

    fn move_left(&mut self, speed_mod: f32) {
        if self.is_stunned() {
            return;
        }
        self.body.vx = -self.horizontal_speed(speed_mod);
        if !self.is_attacking() {
            self.facing_right = false;
        }
    }

    fn move_right(&mut self, speed_mod: f32) {
        if self.is_stunned() {
            return;
        }
        self.body.vx = self.horizontal_speed(speed_mod);
        if !self.is_attacking() {
            self.facing_right = true;
        }
    }

    fn stop_moving(&mut self) {
        self.body.vx = 0.0;
    }

    fn jump(&mut self) -> bool {
        if self.is_stunned() || !self.body.jump(self.jump_strength) {
            return false;
        }
        self.events.publish(CombatEvent::Jumped { entity_id: self.id });
        true
    }

    fn drop_through_platform(&mut self) -> bool {
        if self.is_stunned() {
            return false;
        }
        self.body.begin_drop_through(&self.physics)
    }
}

impl Damageable for Fighter {
    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.body.rect
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn take_damage(&mut self, amount: i32) {
        if amount <= 0 || !self.is_alive() {
            return;
        }
        self.health = (self.health - amount).max(0);
        self.events.publish(CombatEvent::Damaged {
            entity_id: self.id,
            amount,
            remaining: self.health,
        });
        if self.health == 0 {
            debug!("{} '{}' defeated", self.id, self.name);
            self.events.publish(CombatEvent::Defeated { entity_id: self.id });
        }
    }

    fn stun(&mut self, frames: u32) {
        if frames == 0 {
            return;
        }
        self.stun_timer = self.stun_timer.max(frames);
        self.body.vx = 0.0;
        self.events.publish(CombatEvent::Stunned {
            entity_id: self.id,
            frames,
        });
    }

    fn slow(&mut self, frames: u32) {
        self.slow_timer = self.slow_timer.max(frames);
    }

    fn push_back(&mut self, force: f32) {
        self.body.shove(force, &self.world);
    }

    fn push_vertical(&mut self, force: f32) {
        self.body.launch(force);
    }
}

impl AttackCapable for Fighter {
    fn perform_melee_attack(&mut self, targets: &[EntityId]) -> bool {
        self.perform_attack(AttackSlot::Melee, targets)
    }

    fn perform_ranged_attack(&mut self, targets: &[EntityId]) -> bool {
        self.perform_attack(AttackSlot::Ranged, targets)
    }

    fn check_attack_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        let origin = self.origin();
        let mut hits = 0;

        for effect in std::mem::take(&mut self.pending) {
            let mut snapshot: Vec<&mut dyn Damageable> = targets
                .iter_mut()
                .filter(|t| effect.targets.contains(&t.id()))
                .map(|t| &mut **t as &mut dyn Damageable)
                .collect();
            let fired = match effect.trigger {
                Some(_) => {
                    hits += self.attacks.fire(&effect.attack, &origin, &mut snapshot);
                    true
                }
                None => self.attacks.execute(&effect.attack, &origin, &mut snapshot),
            };
            if !fired {
                continue;
            }

            self.events.publish(CombatEvent::EffectFired {
                entity_id: self.id,
                attack: effect.attack.clone(),
                trigger: effect.trigger.unwrap_or(0),
            });
            if self.attacks.kind(&effect.attack) == Some(AttackKind::Projectile) {
                self.events.publish(CombatEvent::ProjectileSpawned {
                    entity_id: self.id,
                    attack: effect.attack,
                });
            }
        }

        hits += self.attacks.check_all_collisions(targets);
        hits += self.attacks.resolve_all_hazards(targets);
        hits
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fighter builders shared by gameplay tests.

    use super::*;
    use crate::animation::{Clip, ClipPlayer};
    use crate::attack::{MeleeAttack, ProjectileAttack};

    /// Clip set with a 10-frame attack clip and a 6-frame shoot clip.
    pub fn clips() -> ClipPlayer {
        ClipPlayer::with_clips([
            Clip::looping(CLIP_IDLE, 4),
            Clip::looping(CLIP_RUN, 6),
            Clip::looping(CLIP_JUMP, 2),
            Clip::once("attack", 10),
            Clip::once("shoot", 6),
        ])
    }

    /// Fighter standing on the floor of a 1000x500 world.
    pub fn fighter_at(team: Team, x: i32) -> Fighter {
        let stats = FighterStats {
            width: 40,
            height: 60,
            max_health: 100,
            move_speed: 4.0,
            jump_strength: 10.0,
        };
        let mut fighter = Fighter::new("dummy", team, &stats, x, 440, Box::new(clips()))
            .with_physics(PhysicsConfig::default(), WorldBounds::new(1000, 500));
        fighter.update(&[], 1.0, 1.0);
        fighter
    }

    /// Fighter with a melee (trigger frame 5, damage 25) and a bolt (trigger 2).
    pub fn armed_fighter(team: Team, x: i32) -> Fighter {
        let mut fighter = fighter_at(team, x);
        fighter.register_attack(Box::new(MeleeAttack::new("slash", 25, 40, 50)));
        fighter.register_attack(Box::new(
            ProjectileAttack::new("bolt", 10, 30, 10.0).with_bounds(WorldBounds::new(1000, 500)),
        ));
        fighter.bind_gate(AttackSlot::Melee, GateSpec::new("slash", "attack", &[5]));
        fighter.bind_gate(AttackSlot::Ranged, GateSpec::new("bolt", "shoot", &[2]));
        fighter
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::attack::MeleeAttack;
    use proptest::prelude::*;

    fn step_pair(attacker: &mut Fighter, victim: &mut Fighter) -> usize {
        attacker.update(&[], 1.0, 1.0);
        victim.update(&[], 1.0, 1.0);
        let mut targets: [&mut dyn Damageable; 1] = [victim];
        attacker.check_attack_collisions(&mut targets)
    }

    #[test]
    fn test_fighter_lands_on_floor() {
        let fighter = fighter_at(Team::Players, 100);
        assert!(fighter.is_on_ground());
        assert_eq!(fighter.rect().bottom(), 500);
        assert_eq!(fighter.animator().current_animation(), Some(CLIP_IDLE));
    }

    #[test]
    fn test_melee_fires_once_on_trigger_frame() {
        let mut knight = armed_fighter(Team::Players, 100);
        let mut boss = fighter_at(Team::Bosses, 150);
        let boss_id = boss.id();

        assert!(knight.perform_melee_attack(&[boss_id]));
        assert_eq!(knight.animator().current_animation(), Some("attack"));

        // Frames 0..=4 are observed on the first five updates
        for _ in 0..5 {
            step_pair(&mut knight, &mut boss);
            assert_eq!(boss.health(), 100);
        }
        assert_eq!(knight.animator().current_frame(), 5);

        assert_eq!(step_pair(&mut knight, &mut boss), 1);
        assert_eq!(boss.health(), 75);

        for _ in 0..10 {
            step_pair(&mut knight, &mut boss);
        }
        assert_eq!(boss.health(), 75);
        assert!(!knight.is_attacking());
        assert_eq!(knight.animator().current_animation(), Some(CLIP_IDLE));
    }

    #[test]
    fn test_double_update_does_not_double_fire() {
        let mut knight = armed_fighter(Team::Players, 100);
        let mut boss = fighter_at(Team::Bosses, 150);
        knight.perform_melee_attack(&[boss.id()]);

        for _ in 0..20 {
            knight.observe_gates();
            step_pair(&mut knight, &mut boss);
        }
        assert_eq!(boss.health(), 75);
    }

    #[test]
    fn test_snapshot_excludes_late_targets() {
        let mut knight = armed_fighter(Team::Players, 100);
        let mut boss = fighter_at(Team::Bosses, 150);
        assert!(knight.perform_melee_attack(&[]));
        for _ in 0..12 {
            step_pair(&mut knight, &mut boss);
        }
        assert_eq!(boss.health(), 100);
    }

    #[test]
    fn test_cooldown_starts_at_attack_start() {
        let mut knight = armed_fighter(Team::Players, 100);
        assert!(knight.perform_melee_attack(&[]));
        assert!(!knight.attacks().can_use("slash"));
        assert!(!knight.perform_melee_attack(&[]));
    }

    #[test]
    fn test_slot_busy_refuses_restart() {
        let mut knight = armed_fighter(Team::Players, 100);
        knight.attacks_mut().register(Box::new(MeleeAttack::new("slash", 25, 0, 50)));
        assert!(knight.perform_melee_attack(&[]));
        knight.update(&[], 1.0, 1.0);
        assert!(knight.attacks().can_use("slash"));
        assert!(!knight.perform_melee_attack(&[]));
    }

    #[test]
    fn test_stun_blocks_new_attacks_and_movement() {
        let mut knight = armed_fighter(Team::Players, 100);
        knight.move_right(1.0);
        knight.stun(3);
        assert_eq!(knight.velocity().0, 0.0);

        knight.move_right(1.0);
        assert_eq!(knight.velocity().0, 0.0);
        assert!(!knight.perform_melee_attack(&[]));
        assert!(!knight.jump());
        assert!(knight.attacks().can_use("slash"));

        for _ in 0..3 {
            knight.update(&[], 1.0, 1.0);
        }
        assert!(!knight.is_stunned());
        knight.move_right(1.0);
        assert_eq!(knight.velocity().0, 4.0);
    }

    #[test]
    fn test_stun_does_not_cancel_attack_in_flight() {
        let mut knight = armed_fighter(Team::Players, 100);
        let mut boss = fighter_at(Team::Bosses, 150);
        knight.perform_melee_attack(&[boss.id()]);
        step_pair(&mut knight, &mut boss);
        knight.stun(30);
        for _ in 0..6 {
            step_pair(&mut knight, &mut boss);
        }
        assert_eq!(boss.health(), 75);
    }

    #[test]
    fn test_ranged_attack_spawns_projectile_on_trigger() {
        let mut ranger = armed_fighter(Team::Players, 100);
        let mut boss = fighter_at(Team::Bosses, 800);
        assert!(ranger.perform_ranged_attack(&[boss.id()]));

        for _ in 0..2 {
            step_pair(&mut ranger, &mut boss);
            assert_eq!(ranger.attacks_mut().projectile_count(), 0);
        }
        step_pair(&mut ranger, &mut boss);
        assert_eq!(ranger.attacks_mut().projectile_count(), 1);

        // 140 -> 800 at 10 px per frame
        for _ in 0..70 {
            step_pair(&mut ranger, &mut boss);
        }
        assert_eq!(boss.health(), 90);
        assert_eq!(ranger.attacks_mut().projectile_count(), 0);
    }

    #[test]
    fn test_missing_clip_fires_immediately() {
        let mut knight = armed_fighter(Team::Players, 100);
        knight.bind_gate(AttackSlot::Special, GateSpec::new("slash", "no-such-clip", &[3]));
        let mut boss = fighter_at(Team::Bosses, 150);
        assert!(knight.perform_special_attack(&[boss.id()]));
        let mut targets: [&mut dyn Damageable; 1] = [&mut boss];
        assert_eq!(knight.check_attack_collisions(&mut targets), 1);
    }

    #[test]
    fn test_facing_locked_during_attack() {
        let mut knight = armed_fighter(Team::Players, 100);
        assert!(knight.facing_right());
        knight.perform_melee_attack(&[]);
        knight.move_left(1.0);
        assert!(knight.facing_right());
        assert!(knight.velocity().0 < 0.0);
    }

    #[test]
    fn test_slow_halves_speed() {
        let mut knight = fighter_at(Team::Players, 100);
        knight.slow(10);
        knight.move_right(1.0);
        assert_eq!(knight.velocity().0, 2.0);
    }

    #[test]
    fn test_drop_through_requires_ground_and_no_stun() {
        let mut knight = fighter_at(Team::Players, 100);
        knight.stun(5);
        assert!(!knight.drop_through_platform());
        for _ in 0..5 {
            knight.update(&[], 1.0, 1.0);
        }
        assert!(knight.drop_through_platform());
        assert!(knight.is_dropping_through());
    }

    #[test]
    fn test_push_back_clamped_to_world() {
        let mut knight = fighter_at(Team::Players, 100);
        knight.push_back(-500.0);
        assert_eq!(knight.x(), 0);
        knight.push_vertical(-8.0);
        assert!(!knight.is_on_ground());
    }

    #[test]
    fn test_reset_restores_round_state() {
        let mut knight = armed_fighter(Team::Players, 100);
        assert!(knight.perform_ranged_attack(&[]));
        for _ in 0..3 {
            knight.update(&[], 1.0, 1.0);
            let mut none: [&mut dyn Damageable; 0] = [];
            knight.check_attack_collisions(&mut none);
        }
        assert_eq!(knight.attacks_mut().projectile_count(), 1);
        knight.take_damage(60);
        knight.stun(50);

        knight.reset(300, 100);
        assert_eq!(knight.health(), 100);
        assert!(!knight.is_stunned());
        assert!(!knight.is_attacking());
        assert_eq!((knight.x(), knight.y()), (300, 100));
        assert!(knight.attacks().can_use("bolt"));
        assert_eq!(knight.attacks_mut().projectile_count(), 0);
    }

    #[test]
    fn test_dead_fighter_ignores_heal_and_damage() {
        let mut knight = fighter_at(Team::Players, 100);
        knight.take_damage(250);
        assert_eq!(knight.health(), 0);
        knight.heal(30);
        assert_eq!(knight.health(), 0);
    }

    #[test]
    fn test_named_attack_resolves_in_collision_pass() {
        let bus = crate::events::EventBus::new(32);
        let mut knight = armed_fighter(Team::Players, 100).with_events(bus.sender());
        let mut boss = fighter_at(Team::Bosses, 150);

        assert!(!knight.perform_named_attack("nope", &[boss.id()]));
        assert!(knight.perform_named_attack("slash", &[boss.id()]));
        assert!(!knight.perform_named_attack("slash", &[boss.id()]), "already queued");
        assert_eq!(boss.health(), 100);

        step_pair(&mut knight, &mut boss);
        assert_eq!(boss.health(), 75);
        assert!(!knight.attacks().can_use("slash"));
        assert!(!knight.perform_named_attack("slash", &[boss.id()]), "cooling down");
        assert!(bus.drain().contains(&CombatEvent::EffectFired {
            entity_id: knight.id(),
            attack: "slash".to_string(),
            trigger: 0,
        }));
    }

    #[test]
    fn test_named_attack_refused_while_stunned() {
        let mut knight = armed_fighter(Team::Players, 100);
        knight.stun(10);
        assert!(!knight.perform_named_attack("slash", &[]));
    }

    #[test]
    fn test_events_published() {
        let bus = crate::events::EventBus::new(32);
        let mut knight = fighter_at(Team::Players, 100).with_events(bus.sender());
        knight.take_damage(100);
        let events = bus.drain();
        assert!(events.contains(&CombatEvent::Defeated {
            entity_id: knight.id()
        }));
    }

    proptest! {
        #[test]
        fn health_stays_in_range(ops in prop::collection::vec((any::<bool>(), 0i32..200), 0..40)) {
            let mut fighter = fighter_at(Team::Players, 100);
            for (is_heal, amount) in ops {
                if is_heal {
                    fighter.heal(amount);
                } else {
                    fighter.take_damage(amount);
                }
                prop_assert!(fighter.health() >= 0);
                prop_assert!(fighter.health() <= fighter.max_health());
            }
        }

        #[test]
        fn stunned_fighter_never_moves_horizontally(frames in 1u32..60, moves in prop::collection::vec(any::<bool>(), 1..60)) {
            let mut fighter = fighter_at(Team::Players, 400);
            fighter.stun(frames);
            for (tick, right) in moves.into_iter().enumerate() {
                if right {
                    fighter.move_right(1.0);
                } else {
                    fighter.move_left(1.0);
                }
                let x_before = fighter.x();
                let stunned = fighter.is_stunned();
                fighter.update(&[], 1.0, 1.0);
                if stunned {
                    prop_assert_eq!(fighter.velocity().0, 0.0, "tick {}", tick);
                    prop_assert_eq!(fighter.x(), x_before);
                }
            }
        }
    }
}
