//! Player-controlled fighters.

use brawl_common::{EntityId, Rect};

use crate::attack::Damageable;
use crate::fighter::{AttackCapable, Fighter, Movable};
use crate::input::{Controls, InputState, KeyBindings};
use crate::platform::Platform;

/// A fighter driven directly by keyboard controls.
#[derive(Debug)]
pub struct Player {
    fighter: Fighter,
    bindings: KeyBindings,
}

impl Player {
    /// Wraps a fighter with a key layout.
    #[must_use]
    pub fn new(fighter: Fighter, bindings: KeyBindings) -> Self {
        Self { fighter, bindings }
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

    /// Key layout.
    #[must_use]
    pub const fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Reads this player's controls from the shared key state.
    #[must_use]
    pub fn read_controls(&self, input: &InputState) -> Controls {
        input.controls(&self.bindings)
    }

    /// Turns controls into intents for this frame.
    ///
    /// Runs before the physics update so the new velocity is integrated in
    /// the same tick. Attack keys fire whenever held; the fighter refuses
    /// while the slot is busy or cooling down.
    pub fn apply_controls(&mut self, controls: Controls, targets: &[EntityId]) {
        let fighter = &mut self.fighter;
        match controls.movement.signum() {
            -1 => fighter.move_left(1.0),
            1 => fighter.move_right(1.0),
            _ => fighter.stop_moving(),
        }
        if controls.jump {
            fighter.jump();
        }
        if controls.drop_through {
            fighter.drop_through_platform();
        }
        if controls.melee {
            fighter.perform_melee_attack(targets);
        }
        if controls.ranged {
            fighter.perform_ranged_attack(targets);
        }
    }

    /// Reads and applies controls in one step.
    pub fn handle_input(&mut self, input: &InputState, targets: &[EntityId]) {
        let controls = self.read_controls(input);
        self.apply_controls(controls, targets);
    }
}

impl Movable for Player {
    fn update(&mut self, platforms: &[Platform], gravity_mod: f32, speed_mod: f32) {
        self.fighter.update(platforms, gravity_mod, speed_mod);
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

impl Damageable for Player {
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

impl AttackCapable for Player {
    fn perform_melee_attack(&mut self, targets: &[EntityId]) -> bool {
        self.fighter.perform_melee_attack(targets)
    }

    fn perform_ranged_attack(&mut self, targets: &[EntityId]) -> bool {
        self.fighter.perform_ranged_attack(targets)
    }

    fn check_attack_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        self.fighter.check_attack_collisions(targets)
    }
}
