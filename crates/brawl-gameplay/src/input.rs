//! Keyboard state and player control mapping.
//!
//! The window layer feeds raw key transitions into [`InputState`]; a
//! [`KeyBindings`] layout turns them into [`Controls`] for one player.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Keys the default layouts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// F key
    F,
    /// G key
    G,
    /// K key
    K,
    /// L key
    L,
    /// S key
    S,
    /// W key
    W,
    /// Space bar
    Space,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
}

/// State of a key (held, and whether the press is new this frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Whether the key is currently held down
    pub pressed: bool,
    /// Whether the key was just pressed this frame
    pub just_pressed: bool,
}

impl ButtonState {
    /// Update the state based on whether the key is currently pressed.
    pub fn update(&mut self, is_pressed: bool) {
        self.just_pressed = is_pressed && !self.pressed;
        self.pressed = is_pressed;
    }

    /// Clear the frame-specific state.
    pub fn clear_frame(&mut self) {
        self.just_pressed = false;
    }
}

/// Player actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Walk left
    MoveLeft,
    /// Walk right
    MoveRight,
    /// Jump
    Jump,
    /// Drop through the platform underfoot
    Drop,
    /// Primary melee attack
    Melee,
    /// Primary ranged attack
    Ranged,
}

impl Action {
    /// Every action.
    pub const ALL: [Self; 6] = [
        Self::MoveLeft,
        Self::MoveRight,
        Self::Jump,
        Self::Drop,
        Self::Melee,
        Self::Ranged,
    ];
}

/// Keys bound to one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Primary key
    pub primary: KeyCode,
    /// Optional secondary key
    pub secondary: Option<KeyCode>,
}

impl KeyBinding {
    /// Create a binding with only a primary key.
    #[must_use]
    pub const fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Create a binding with primary and secondary keys.
    #[must_use]
    pub const fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Check if a key matches this binding.
    #[must_use]
    pub fn matches(&self, key: KeyCode) -> bool {
        self.primary == key || self.secondary == Some(key)
    }
}

/// One player's key layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    bindings: AHashMap<Action, KeyBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::wasd()
    }
}

impl KeyBindings {
    /// WASD movement, F melee, G ranged, Space also jumps.
    #[must_use]
    pub fn wasd() -> Self {
        let mut bindings = AHashMap::new();
        bindings.insert(Action::MoveLeft, KeyBinding::new(KeyCode::A));
        bindings.insert(Action::MoveRight, KeyBinding::new(KeyCode::D));
        bindings.insert(
            Action::Jump,
            KeyBinding::with_secondary(KeyCode::W, KeyCode::Space),
        );
        bindings.insert(Action::Drop, KeyBinding::new(KeyCode::S));
        bindings.insert(Action::Melee, KeyBinding::new(KeyCode::F));
        bindings.insert(Action::Ranged, KeyBinding::new(KeyCode::G));
        Self { bindings }
    }

    /// Arrow movement, K melee, L ranged.
    #[must_use]
    pub fn arrows() -> Self {
        let mut bindings = AHashMap::new();
        bindings.insert(Action::MoveLeft, KeyBinding::new(KeyCode::Left));
        bindings.insert(Action::MoveRight, KeyBinding::new(KeyCode::Right));
        bindings.insert(Action::Jump, KeyBinding::new(KeyCode::Up));
        bindings.insert(Action::Drop, KeyBinding::new(KeyCode::Down));
        bindings.insert(Action::Melee, KeyBinding::new(KeyCode::K));
        bindings.insert(Action::Ranged, KeyBinding::new(KeyCode::L));
        Self { bindings }
    }

    /// Rebind an action.
    pub fn rebind(&mut self, action: Action, binding: KeyBinding) {
        self.bindings.insert(action, binding);
    }

    /// Get the binding for an action.
    #[must_use]
    pub fn get(&self, action: Action) -> Option<&KeyBinding> {
        self.bindings.get(&action)
    }

    /// Primary key of an action, if bound.
    #[must_use]
    pub fn key_for(&self, action: Action) -> Option<KeyCode> {
        self.bindings.get(&action).map(|b| b.primary)
    }
}

/// Raw key states for the current frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: AHashMap<KeyCode, ButtonState>,
}

impl InputState {
    /// Create an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update a key state.
    pub fn update_key(&mut self, key: KeyCode, is_pressed: bool) {
        self.keys.entry(key).or_default().update(is_pressed);
    }

    /// Clear frame-specific state. Call at the end of each frame.
    pub fn end_frame(&mut self) {
        for state in self.keys.values_mut() {
            state.clear_frame();
        }
    }

    /// Check if a key is currently pressed.
    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).is_some_and(|state| state.pressed)
    }

    /// Check if a key was just pressed this frame.
    #[must_use]
    pub fn is_key_just_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).is_some_and(|state| state.just_pressed)
    }

    /// Check if an action is held under a layout.
    #[must_use]
    pub fn is_action_pressed(&self, bindings: &KeyBindings, action: Action) -> bool {
        bindings.get(action).is_some_and(|binding| {
            self.is_key_pressed(binding.primary)
                || binding.secondary.is_some_and(|key| self.is_key_pressed(key))
        })
    }

    /// Check if an action was just pressed under a layout.
    #[must_use]
    pub fn is_action_just_pressed(&self, bindings: &KeyBindings, action: Action) -> bool {
        bindings.get(action).is_some_and(|binding| {
            self.is_key_just_pressed(binding.primary)
                || binding
                    .secondary
                    .is_some_and(|key| self.is_key_just_pressed(key))
        })
    }

    /// Process raw keys into one player's controls.
    #[must_use]
    pub fn controls(&self, bindings: &KeyBindings) -> Controls {
        let mut movement = 0;
        if self.is_action_pressed(bindings, Action::MoveLeft) {
            movement -= 1;
        }
        if self.is_action_pressed(bindings, Action::MoveRight) {
            movement += 1;
        }
        Controls {
            movement,
            jump: self.is_action_pressed(bindings, Action::Jump),
            drop_through: self.is_action_just_pressed(bindings, Action::Drop),
            melee: self.is_action_pressed(bindings, Action::Melee),
            ranged: self.is_action_pressed(bindings, Action::Ranged),
        }
    }
}

/// One player's processed controls for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    /// -1 left, 0 none, 1 right
    pub movement: i8,
    /// Jump held
    pub jump: bool,
    /// Drop-through just pressed
    pub drop_through: bool,
    /// Melee held
    pub melee: bool,
    /// Ranged held
    pub ranged: bool,
}
