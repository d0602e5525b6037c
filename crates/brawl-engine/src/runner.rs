//! Headless match runner.
//!
//! Plays a configured number of rounds of one player character against one
//! boss. The player side is driven by an AI strategy that presses keys
//! through the normal input mapping, so it exercises exactly the code path
//! a human would.

use anyhow::{Context, Result};
use brawl_common::{horizontal_distance, EntityId, Rect, Team};
use brawl_gameplay::ai::{AiBehavior, AiContext, AttackChoice, MoveIntent};
use brawl_gameplay::arena::{Arena, Contender, Outcome};
use brawl_gameplay::attack::Damageable;
use brawl_gameplay::events::CombatEvent;
use brawl_gameplay::fighter::{Fighter, FighterView};
use brawl_gameplay::input::{Action, InputState, KeyBindings};
use brawl_gameplay::player::Player;
use brawl_gameplay::profile::Roster;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::stage::{MapEffects, StageConfig};
use crate::timing::FrameTiming;

/// Presses keys for one player from an AI strategy.
#[derive(Debug)]
pub struct Autopilot {
    behavior: AiBehavior,
    rng: fastrand::Rng,
    bindings: KeyBindings,
    input: InputState,
}

impl Autopilot {
    /// Creates an autopilot typing on `bindings`.
    #[must_use]
    pub fn new(behavior: AiBehavior, bindings: KeyBindings, seed: u64) -> Self {
        Self {
            behavior,
            rng: fastrand::Rng::with_seed(seed),
            bindings,
            input: InputState::new(),
        }
    }

    /// Decides this frame for fighter `me` and returns the keys to feed the
    /// arena. Speed scaling and explicit facing have no key equivalent, so
    /// the player always walks at full speed and faces where it walks.
    pub fn steer(&mut self, arena: &Arena, me: EntityId) -> &InputState {
        self.input.end_frame();

        let Some(ctx) = self.context(arena, me) else {
            self.release_all();
            return &self.input;
        };
        let intent = self.behavior.decide(&ctx, &mut self.rng);

        self.press(Action::MoveLeft, intent.movement == MoveIntent::Left);
        self.press(Action::MoveRight, intent.movement == MoveIntent::Right);
        self.press(Action::Jump, intent.jump);
        self.press(Action::Drop, intent.drop_through);
        self.press(Action::Melee, intent.attack == Some(AttackChoice::Melee));
        self.press(Action::Ranged, intent.attack == Some(AttackChoice::Ranged));
        &self.input
    }

    fn context<'a>(&self, arena: &'a Arena, me: EntityId) -> Option<AiContext<'a>> {
        let fighter = arena.fighter(me).filter(|f| f.is_alive())?;
        let bounds = fighter.rect();
        let target = nearest_opponent(arena, fighter.team(), &bounds)?;

        let manager = fighter.attacks();
        let ready = |name: Option<&str>| name.is_some_and(|n| manager.can_use(n));
        Some(AiContext {
            bounds,
            on_ground: fighter.is_on_ground(),
            melee_ready: ready(manager.primary_melee()),
            ranged_ready: ready(manager.primary_ranged()),
            target,
            platforms: arena.platforms(),
            world: fighter.world(),
        })
    }

    fn press(&mut self, action: Action, down: bool) {
        if let Some(key) = self.bindings.key_for(action) {
            self.input.update_key(key, down);
        }
    }

    fn release_all(&mut self) {
        for action in Action::ALL {
            self.press(action, false);
        }
    }
}

fn nearest_opponent(arena: &Arena, team: Team, me: &Rect) -> Option<Rect> {
    arena
        .contenders()
        .iter()
        .map(Contender::fighter)
        .filter(|f| f.team() != team && f.is_alive())
        .map(Fighter::rect)
        .min_by(|a, b| horizontal_distance(me, a).total_cmp(&horizontal_distance(me, b)))
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    /// One side was wiped out
    Winner(Team),
    /// Both sides fell on the same tick
    Draw,
    /// The tick limit ran out
    Timeout,
}

/// What happened in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Round number (1-based)
    pub round: u32,
    /// Ticks played
    pub ticks: u32,
    /// Result
    pub result: RoundResult,
    /// Damage the player side dealt
    pub damage_dealt: i32,
    /// Damage the player side took
    pub damage_taken: i32,
    /// Boss specials used
    pub specials: u32,
    /// Fighters at the end of the round
    pub fighters: Vec<FighterView>,
}

/// Result of a whole match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// Player character
    pub player: String,
    /// Boss character
    pub boss: String,
    /// Stage name
    pub stage: String,
    /// Every round in order
    pub rounds: Vec<RoundSummary>,
    /// Rounds the player won
    pub player_wins: u32,
    /// Rounds the boss won
    pub boss_wins: u32,
    /// Rounds nobody won
    pub draws: u32,
    /// Rounds that hit the tick limit
    pub timeouts: u32,
}

impl MatchSummary {
    fn record(&mut self, round: RoundSummary) {
        match round.result {
            RoundResult::Winner(Team::Players) => self.player_wins += 1,
            RoundResult::Winner(Team::Bosses) => self.boss_wins += 1,
            RoundResult::Draw => self.draws += 1,
            RoundResult::Timeout => self.timeouts += 1,
        }
        self.rounds.push(round);
    }
}

#[derive(Debug, Default)]
struct Tally {
    damage_dealt: i32,
    damage_taken: i32,
    specials: u32,
}

/// Owns one match and plays it out.
#[derive(Debug)]
pub struct MatchRunner {
    config: EngineConfig,
    stage: StageConfig,
    arena: Arena,
    effects: MapEffects,
    autopilot: Autopilot,
    player_id: EntityId,
    timing: FrameTiming,
}

impl MatchRunner {
    /// Loads the roster and stage and builds the arena.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let roster = match &config.roster_path {
            Some(path) => Roster::load(path)
                .with_context(|| format!("failed to load roster {}", path.display()))?,
            None => Roster::builtin(),
        };
        let stage = match &config.stage_path {
            Some(path) => StageConfig::load(path)
                .with_context(|| format!("failed to load stage {}", path.display()))?,
            None => StageConfig::default(),
        };

        let world = stage.world;
        let player_profile = roster
            .get(&config.player)
            .context("player character not in roster")?;
        let boss = roster
            .get(&config.boss)
            .context("boss character not in roster")?
            .build_boss(
                stage.boss_spawn.x,
                stage.boss_spawn.y,
                &config.physics,
                world,
                config.seed,
            )?;

        let bindings = KeyBindings::arrows();
        let mut arena = Arena::new(stage.build_platforms(), stage.environment());
        let player_id = arena.add_player(Player::new(
            player_profile.build_fighter(
                Team::Players,
                stage.player_spawn.x,
                stage.player_spawn.y,
                &config.physics,
                world,
            ),
            bindings.clone(),
        ));
        arena.add_boss(boss);

        info!(
            "Match ready: {} vs {} on '{}'",
            player_profile.name, config.boss, stage.name
        );

        Ok(Self {
            autopilot: Autopilot::new(
                config.player_ai.clone(),
                bindings,
                config.seed.rotate_left(17),
            ),
            effects: MapEffects::new(stage.hazards),
            timing: FrameTiming::new(config.tick_rate),
            config,
            stage,
            arena,
            player_id,
        })
    }

    /// Plays every configured round.
    pub fn run(&mut self) -> MatchSummary {
        let mut summary = MatchSummary {
            player: self.name_of(Team::Players),
            boss: self.name_of(Team::Bosses),
            stage: self.stage.name.clone(),
            rounds: Vec::new(),
            player_wins: 0,
            boss_wins: 0,
            draws: 0,
            timeouts: 0,
        };
        for _ in 0..self.config.rounds {
            let round = self.play_round();
            summary.record(round);
        }
        info!(
            "Match over: player {} / boss {} / draws {} / timeouts {}",
            summary.player_wins, summary.boss_wins, summary.draws, summary.timeouts
        );
        summary
    }

    /// Plays one round from the spawn points.
    pub fn play_round(&mut self) -> RoundSummary {
        let spawns = [
            (self.stage.player_spawn.x, self.stage.player_spawn.y),
            (self.stage.boss_spawn.x, self.stage.boss_spawn.y),
        ];
        self.arena.reset_round(&spawns);
        self.effects.reset();
        self.timing.reset();

        let max_ticks = self.config.max_ticks_per_round;
        let mut tally = Tally::default();
        let mut ticks = 0;
        let mut outcome = Outcome::Ongoing;

        while ticks < max_ticks && outcome == Outcome::Ongoing {
            let due = if self.config.realtime {
                self.timing.sleep_remainder();
                let dt = self.timing.delta_time();
                self.timing.accumulate(dt)
            } else {
                1
            };
            for _ in 0..due {
                ticks += 1;
                outcome = self.step(&mut tally);
                if outcome != Outcome::Ongoing || ticks >= max_ticks {
                    break;
                }
            }
        }

        if self.config.realtime {
            debug!("Round paced at {:.1} ticks/s", self.timing.current_rate());
        }

        let result = match outcome {
            Outcome::Ongoing => RoundResult::Timeout,
            Outcome::Winner(team) => RoundResult::Winner(team),
            Outcome::Draw => RoundResult::Draw,
        };
        let round = RoundSummary {
            round: self.arena.round(),
            ticks,
            result,
            damage_dealt: tally.damage_dealt,
            damage_taken: tally.damage_taken,
            specials: tally.specials,
            fighters: self.arena.views(),
        };
        info!(
            "Round {} finished after {} ticks: {:?} (dealt {}, taken {}, {} specials)",
            round.round,
            round.ticks,
            round.result,
            round.damage_dealt,
            round.damage_taken,
            round.specials
        );
        round
    }

    fn step(&mut self, tally: &mut Tally) -> Outcome {
        let input = self.autopilot.steer(&self.arena, self.player_id);
        self.arena.tick(input);
        self.effects.apply(&mut self.arena);

        for event in self.arena.events().drain() {
            match event {
                CombatEvent::Damaged {
                    entity_id, amount, ..
                } => {
                    if entity_id == self.player_id {
                        tally.damage_taken += amount;
                    } else {
                        tally.damage_dealt += amount;
                    }
                }
                CombatEvent::SpecialAttack { special, .. } => {
                    tally.specials += 1;
                    debug!("Boss used {}", special);
                }
                _ => {}
            }
        }
        // Hazards may have finished someone off after the tick
        self.arena.outcome()
    }

    fn name_of(&self, team: Team) -> String {
        self.arena
            .contenders()
            .iter()
            .map(Contender::fighter)
            .find(|f| f.team() == team)
            .map_or_else(String::new, |f| f.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::HazardConfig;
    use brawl_gameplay::input::KeyCode;
    use std::fs;
    use tempfile::TempDir;

    fn short_config(rounds: u32, max_ticks: u32) -> EngineConfig {
        EngineConfig {
            rounds,
            max_ticks_per_round: max_ticks,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_autopilot_walks_toward_boss() {
        let runner = MatchRunner::new(EngineConfig::default()).expect("runner");
        let mut autopilot = Autopilot::new(AiBehavior::default(), KeyBindings::arrows(), 1);
        let input = autopilot.steer(&runner.arena, runner.player_id);
        // Boss spawns far to the right
        assert!(input.is_key_pressed(KeyCode::Right));
        assert!(!input.is_key_pressed(KeyCode::Left));
        assert!(!input.is_key_pressed(KeyCode::K));
    }

    #[test]
    fn test_autopilot_releases_keys_without_target() {
        let mut runner = MatchRunner::new(EngineConfig::default()).expect("runner");
        let mut autopilot = Autopilot::new(AiBehavior::default(), KeyBindings::arrows(), 1);
        autopilot.steer(&runner.arena, runner.player_id);

        for contender in runner.arena.contenders_mut() {
            if contender.fighter().team() == Team::Bosses {
                contender.fighter_mut().take_damage(10_000);
            }
        }
        let input = autopilot.steer(&runner.arena, runner.player_id);
        for action in Action::ALL {
            let key = KeyBindings::arrows().key_for(action).expect("bound");
            assert!(!input.is_key_pressed(key), "{action:?} still held");
        }
    }

    #[test]
    fn test_timeout_round() {
        let mut runner = MatchRunner::new(short_config(1, 30)).expect("runner");
        let summary = runner.run();

        assert_eq!(summary.rounds.len(), 1);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.rounds[0].ticks, 30);
        assert_eq!(summary.rounds[0].result, RoundResult::Timeout);
        assert_eq!(summary.rounds[0].fighters.len(), 2);
        assert_eq!(summary.player, "Knight");
        assert_eq!(summary.boss, "Warden");
    }

    #[test]
    fn test_rounds_are_counted() {
        let mut runner = MatchRunner::new(short_config(3, 2000)).expect("runner");
        let summary = runner.run();

        assert_eq!(summary.rounds.len(), 3);
        assert_eq!(
            summary.player_wins + summary.boss_wins + summary.draws + summary.timeouts,
            3
        );
        for (i, round) in summary.rounds.iter().enumerate() {
            assert_eq!(round.round, i as u32 + 1);
            assert!(round.ticks <= 2000);
            if let RoundResult::Winner(team) = round.result {
                assert!(round
                    .fighters
                    .iter()
                    .filter(|f| f.team != team)
                    .all(|f| f.health == 0));
            }
        }
    }

    #[test]
    fn test_burning_stage_hurts_the_player() {
        let mut runner = MatchRunner::new(short_config(1, 100)).expect("runner");
        runner.effects = MapEffects::new(HazardConfig {
            burn_damage: 1,
            burn_interval: 1,
            ..HazardConfig::default()
        });
        let round = runner.play_round();
        assert!(round.damage_taken > 0);
        let player = round
            .fighters
            .iter()
            .find(|f| f.team == Team::Players)
            .expect("player");
        assert!(player.health < player.max_health);
    }

    #[test]
    fn test_unknown_character_is_an_error() {
        let config = EngineConfig {
            boss: "Nobody".to_string(),
            ..EngineConfig::default()
        };
        assert!(MatchRunner::new(config).is_err());
    }

    #[test]
    fn test_player_character_cannot_be_boss() {
        let config = EngineConfig {
            boss: "Ranger".to_string(),
            ..EngineConfig::default()
        };
        assert!(MatchRunner::new(config).is_err());
    }

    #[test]
    fn test_missing_roster_reports_path() {
        let config = EngineConfig {
            roster_path: Some("/nonexistent/roster.ron".into()),
            ..EngineConfig::default()
        };
        let err = MatchRunner::new(config).expect_err("missing roster");
        assert!(format!("{err:#}").contains("/nonexistent/roster.ron"));
    }

    #[test]
    fn test_stage_and_roster_from_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let roster_path = temp_dir.path().join("roster.ron");
        let stage_path = temp_dir.path().join("stage.toml");
        fs::write(&roster_path, Roster::builtin().to_ron().expect("ron")).expect("write");
        fs::write(
            &stage_path,
            r#"
name = "Pit"

[player_spawn]
x = 100
y = 300

[boss_spawn]
x = 600
y = 300

[[platforms]]
x = 0
y = 560
width = 1280
height = 160
ground = true
"#,
        )
        .expect("write");

        let config = EngineConfig {
            roster_path: Some(roster_path),
            stage_path: Some(stage_path),
            player: "ranger".to_string(),
            boss: "Voidmaw".to_string(),
            ..short_config(1, 5)
        };
        let mut runner = MatchRunner::new(config).expect("runner");
        assert_eq!(runner.arena.platforms().len(), 1);

        let summary = runner.run();
        assert_eq!(summary.stage, "Pit");
        assert_eq!(summary.player, "Ranger");
        assert_eq!(summary.boss, "Voidmaw");
    }

    #[test]
    fn test_summary_serializes() {
        let mut runner = MatchRunner::new(short_config(1, 3)).expect("runner");
        let summary = runner.run();
        let json = serde_json::to_string(&summary).expect("json");
        let back: MatchSummary = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, summary);
    }
}
