//! Match orchestration.
//!
//! [`Arena::tick`] runs one fixed step in a strict order:
//! 1. intents from input or AI, for every contender
//! 2. physics and animation updates, for every contender
//! 3. attack collision passes, after everyone has moved
//! 4. outcome check
//!
//! Hits are therefore always tested against this frame's positions.

use brawl_common::{horizontal_distance, EntityId, Rect, Team};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::attack::{AttackVisual, Damageable};
use crate::boss::Boss;
use crate::events::{CombatEvent, EventBus};
use crate::fighter::{AttackCapable, Combatant, Fighter, FighterView, Movable};
use crate::input::InputState;
use crate::platform::Platform;
use crate::player::Player;

/// Stage-wide multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Gravity multiplier
    pub gravity_mod: f32,
    /// Horizontal speed multiplier
    pub speed_mod: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity_mod: 1.0,
            speed_mod: 1.0,
        }
    }
}

/// How a match stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Both sides still standing
    Ongoing,
    /// Only one side has fighters left
    Winner(Team),
    /// Nobody is left
    Draw,
}

/// A participant in the arena.
#[derive(Debug)]
pub enum Contender {
    /// Keyboard-driven
    Player(Player),
    /// AI-driven
    Boss(Boss),
}

impl Contender {
    /// The underlying fighter.
    #[must_use]
    pub const fn fighter(&self) -> &Fighter {
        match self {
            Self::Player(p) => p.fighter(),
            Self::Boss(b) => b.fighter(),
        }
    }

    /// The underlying fighter, mutable.
    pub fn fighter_mut(&mut self) -> &mut Fighter {
        match self {
            Self::Player(p) => p.fighter_mut(),
            Self::Boss(b) => b.fighter_mut(),
        }
    }

    /// The boss, if this is one.
    #[must_use]
    pub const fn as_boss(&self) -> Option<&Boss> {
        match self {
            Self::Boss(b) => Some(b),
            Self::Player(_) => None,
        }
    }

    /// Puts the contender back at a spawn point.
    pub fn reset(&mut self, x: i32, y: i32) {
        match self {
            Self::Player(p) => p.fighter_mut().reset(x, y),
            Self::Boss(b) => b.reset(x, y),
        }
    }

    fn combatant_mut(&mut self) -> &mut dyn Combatant {
        match self {
            Self::Player(p) => p,
            Self::Boss(b) => b,
        }
    }
}

/// Fighters, stage and notification bus of one match.
#[derive(Debug)]
pub struct Arena {
    contenders: Vec<Contender>,
    platforms: Vec<Platform>,
    environment: Environment,
    events: EventBus,
    frame: u64,
    round: u32,
}

impl Arena {
    /// Creates an empty arena. Platform order is kept for landing checks.
    #[must_use]
    pub fn new(platforms: Vec<Platform>, environment: Environment) -> Self {
        Self {
            contenders: Vec::new(),
            platforms,
            environment,
            events: EventBus::default(),
            frame: 0,
            round: 0,
        }
    }

    /// Adds a player and connects it to the event bus.
    pub fn add_player(&mut self, mut player: Player) -> EntityId {
        player.fighter_mut().set_events(self.events.sender());
        let id = player.fighter().id();
        self.contenders.push(Contender::Player(player));
        id
    }

    /// Adds a boss and connects it to the event bus.
    pub fn add_boss(&mut self, mut boss: Boss) -> EntityId {
        boss.fighter_mut().set_events(self.events.sender());
        let id = boss.fighter().id();
        self.contenders.push(Contender::Boss(boss));
        id
    }

    /// Contenders in insertion order.
    #[must_use]
    pub fn contenders(&self) -> &[Contender] {
        &self.contenders
    }

    /// Contenders, mutable. Map effects go through the fighters' public
    /// mutators.
    pub fn contenders_mut(&mut self) -> &mut [Contender] {
        &mut self.contenders
    }

    /// Fighter by ID.
    #[must_use]
    pub fn fighter(&self, id: EntityId) -> Option<&Fighter> {
        self.contenders
            .iter()
            .map(Contender::fighter)
            .find(|f| f.id() == id)
    }

    /// Stage platforms.
    #[must_use]
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    /// Stage multipliers.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Notification bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Frames run since the arena was created.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Current round (0 before the first reset).
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Starts a new round, resetting contender `i` at `spawns[i]`.
    /// Contenders without a spawn point stay where they are.
    pub fn reset_round(&mut self, spawns: &[(i32, i32)]) {
        for (i, contender) in self.contenders.iter_mut().enumerate() {
            let (x, y) = spawns.get(i).copied().unwrap_or_else(|| {
                let rect = contender.fighter().rect();
                (rect.x, rect.y)
            });
            contender.reset(x, y);
        }
        self.round += 1;
        info!("Round {} started with {} fighters", self.round, self.contenders.len());
        self.events
            .publish(CombatEvent::RoundStarted { round: self.round });
    }

    /// Runs one frame.
    pub fn tick(&mut self, input: &InputState) -> Outcome {
        self.gather_intents(input);

        let env = self.environment;
        for contender in &mut self.contenders {
            contender
                .combatant_mut()
                .update(&self.platforms, env.gravity_mod, env.speed_mod);
        }

        self.resolve_collisions();
        self.frame += 1;
        self.outcome()
    }

    fn gather_intents(&mut self, input: &InputState) {
        let roster: Vec<(EntityId, Team, Rect, bool)> = self
            .contenders
            .iter()
            .map(|c| {
                let f = c.fighter();
                (f.id(), f.team(), f.rect(), f.is_alive())
            })
            .collect();

        for contender in &mut self.contenders {
            let fighter = contender.fighter();
            if !fighter.is_alive() {
                contender.combatant_mut().stop_moving();
                continue;
            }
            let team = fighter.team();
            let opponents: Vec<(EntityId, Rect)> = roster
                .iter()
                .filter(|(_, t, _, alive)| *t != team && *alive)
                .map(|&(id, _, rect, _)| (id, rect))
                .collect();
            let ids: Vec<EntityId> = opponents.iter().map(|(id, _)| *id).collect();

            match contender {
                Contender::Player(player) => player.handle_input(input, &ids),
                Contender::Boss(boss) => {
                    let target = pick_target(boss, &opponents);
                    boss.set_target(target.map(|(id, _)| id));
                    boss.think(target.map(|(_, rect)| rect), &ids, &self.platforms);
                }
            }
        }
    }

    fn resolve_collisions(&mut self) -> usize {
        let mut hits = 0;
        for i in 0..self.contenders.len() {
            let (before, rest) = self.contenders.split_at_mut(i);
            let Some((attacker, after)) = rest.split_first_mut() else {
                continue;
            };
            let team = attacker.fighter().team();
            let mut targets: Vec<&mut dyn Damageable> = before
                .iter_mut()
                .chain(after.iter_mut())
                .filter(|c| c.fighter().team() != team)
                .map(|c| c.fighter_mut() as &mut dyn Damageable)
                .collect();
            hits += attacker.combatant_mut().check_attack_collisions(&mut targets);
        }
        hits
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        let alive = |team: Team| {
            self.contenders
                .iter()
                .any(|c| c.fighter().team() == team && c.fighter().is_alive())
        };
        match (alive(Team::Players), alive(Team::Bosses)) {
            (true, true) => Outcome::Ongoing,
            (true, false) => Outcome::Winner(Team::Players),
            (false, true) => Outcome::Winner(Team::Bosses),
            (false, false) => Outcome::Draw,
        }
    }

    /// Snapshots of every fighter.
    #[must_use]
    pub fn views(&self) -> Vec<FighterView> {
        self.contenders.iter().map(|c| c.fighter().view()).collect()
    }

    /// Draw data for every attack in the arena.
    #[must_use]
    pub fn visuals(&self) -> Vec<AttackVisual> {
        self.contenders
            .iter()
            .flat_map(|c| c.fighter().draw_attacks())
            .collect()
    }
}

/// Keeps the current target while it is a live opponent, otherwise picks
/// the horizontally nearest one.
fn pick_target(boss: &Boss, opponents: &[(EntityId, Rect)]) -> Option<(EntityId, Rect)> {
    if let Some(current) = boss.target() {
        if let Some(found) = opponents.iter().find(|(id, _)| *id == current) {
            return Some(*found);
        }
    }
    let me = boss.fighter().rect();
    opponents.iter().copied().min_by(|(_, a), (_, b)| {
        horizontal_distance(&me, a).total_cmp(&horizontal_distance(&me, b))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiBehavior, DuelistTuning};
    use crate::boss::BossTuning;
    use crate::fighter::test_support::*;
    use crate::input::{KeyBindings, KeyCode};

    fn duel(attacker_x: i32, defender_x: i32) -> (Arena, EntityId, EntityId) {
        let mut arena = Arena::new(Vec::new(), Environment::default());
        let a = arena.add_player(Player::new(
            armed_fighter(Team::Players, attacker_x),
            KeyBindings::arrows(),
        ));
        let b = arena.add_player(Player::new(
            armed_fighter(Team::Bosses, defender_x),
            KeyBindings::wasd(),
        ));
        (arena, a, b)
    }

    fn health(arena: &Arena, id: EntityId) -> i32 {
        arena.fighter(id).map_or(-1, Fighter::health)
    }

    fn idle_boss(x: i32) -> Boss {
        let tuning = BossTuning {
            behavior: AiBehavior::Duelist(DuelistTuning {
                preferred_distance: 10_000.0,
                melee_max: -1.0,
                jump_chance: 0,
                drop_chance: 0,
                ..DuelistTuning::default()
            }),
            special_interval: 10_000,
            ..BossTuning::default()
        };
        Boss::new(armed_fighter(Team::Bosses, x), tuning, 5)
    }

    #[test]
    fn test_input_moves_before_physics() {
        let (mut arena, a, _) = duel(100, 600);
        let mut input = InputState::new();
        input.update_key(KeyCode::Right, true);
        arena.tick(&input);
        assert_eq!(arena.fighter(a).map(Fighter::x), Some(104));
    }

    #[test]
    fn test_speed_multiplier_applies() {
        let (mut arena, a, _) = duel(100, 600);
        arena.environment.speed_mod = 0.5;
        let mut input = InputState::new();
        input.update_key(KeyCode::Right, true);
        arena.tick(&input);
        assert_eq!(arena.fighter(a).map(Fighter::x), Some(102));
    }

    #[test]
    fn test_melee_lands_through_ticks() {
        let (mut arena, _, b) = duel(100, 160);
        let mut input = InputState::new();
        input.update_key(KeyCode::K, true);
        for _ in 0..5 {
            arena.tick(&input);
        }
        assert_eq!(health(&arena, b), 100);
        arena.tick(&input);
        assert_eq!(health(&arena, b), 75);
        for _ in 0..20 {
            arena.tick(&input);
        }
        assert_eq!(health(&arena, b), 75);
    }

    #[test]
    fn test_visuals_follow_the_landed_swing() {
        let (mut arena, _, _) = duel(100, 160);
        let mut input = InputState::new();
        input.update_key(KeyCode::K, true);
        let slash = |arena: &Arena| {
            arena
                .visuals()
                .iter()
                .any(|v| matches!(v, AttackVisual::Hitbox { attack, .. } if attack == "slash"))
        };

        // Windup draws nothing
        for _ in 0..5 {
            arena.tick(&input);
            assert!(arena.visuals().is_empty());
        }
        for _ in 0..10 {
            arena.tick(&input);
            assert!(slash(&arena));
        }
        arena.tick(&input);
        assert!(arena.visuals().is_empty());
    }

    #[test]
    fn test_teammates_are_not_targets() {
        let mut arena = Arena::new(Vec::new(), Environment::default());
        arena.add_player(Player::new(armed_fighter(Team::Players, 100), KeyBindings::arrows()));
        let ally = arena.add_player(Player::new(
            armed_fighter(Team::Players, 160),
            KeyBindings::wasd(),
        ));
        let mut input = InputState::new();
        input.update_key(KeyCode::K, true);
        for _ in 0..10 {
            arena.tick(&input);
        }
        assert_eq!(health(&arena, ally), 100);
    }

    #[test]
    fn test_outcome_tracks_defeat() {
        let (mut arena, _, b) = duel(100, 600);
        assert_eq!(arena.outcome(), Outcome::Ongoing);
        for contender in arena.contenders_mut() {
            if contender.fighter().id() == b {
                contender.fighter_mut().take_damage(1000);
            }
        }
        assert_eq!(arena.tick(&InputState::new()), Outcome::Winner(Team::Players));
    }

    #[test]
    fn test_reset_round_restores_fighters() {
        let (mut arena, a, b) = duel(100, 600);
        for contender in arena.contenders_mut() {
            contender.fighter_mut().take_damage(30);
        }
        arena.events().drain();

        arena.reset_round(&[(50, 440), (700, 440)]);
        assert_eq!(arena.round(), 1);
        assert_eq!(health(&arena, a), 100);
        assert_eq!(health(&arena, b), 100);
        assert_eq!(arena.fighter(b).map(Fighter::x), Some(700));
        assert!(arena
            .events()
            .drain()
            .contains(&CombatEvent::RoundStarted { round: 1 }));
    }

    #[test]
    fn test_boss_targets_nearest_live_opponent() {
        let mut arena = Arena::new(Vec::new(), Environment::default());
        let far = arena.add_player(Player::new(armed_fighter(Team::Players, 100), KeyBindings::arrows()));
        let near = arena.add_player(Player::new(armed_fighter(Team::Players, 400), KeyBindings::wasd()));
        arena.add_boss(idle_boss(600));

        let input = InputState::new();
        arena.tick(&input);
        let target = |arena: &Arena| arena.contenders()[2].as_boss().and_then(Boss::target);
        assert_eq!(target(&arena), Some(near));

        for contender in arena.contenders_mut() {
            if contender.fighter().id() == near {
                contender.fighter_mut().take_damage(1000);
            }
        }
        arena.tick(&input);
        assert_eq!(target(&arena), Some(far));
    }

    #[test]
    fn test_events_reach_the_bus() {
        let (mut arena, _, _) = duel(100, 160);
        let mut input = InputState::new();
        input.update_key(KeyCode::K, true);
        for _ in 0..6 {
            arena.tick(&input);
        }
        let events = arena.events().drain();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::AttackStarted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Damaged { amount: 25, .. })));
    }
}
