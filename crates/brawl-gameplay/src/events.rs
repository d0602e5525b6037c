//! Event bus for audio and rendering notifications.
//!
//! The simulation publishes what happened during a tick; listeners such as
//! the sound player or hit-spark renderer drain the bus on their own
//! schedule. Publishing never blocks a tick.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use brawl_common::EntityId;

/// Things that happened during a simulation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A new round began
    RoundStarted {
        /// Round number (1-based)
        round: u32,
    },
    /// A fighter started an attack
    AttackStarted {
        /// Attacker
        entity_id: EntityId,
        /// Attack name
        attack: String,
    },
    /// An animation trigger frame released an attack's effect
    EffectFired {
        /// Attacker
        entity_id: EntityId,
        /// Attack name
        attack: String,
        /// Which trigger of the swing fired (0-based)
        trigger: usize,
    },
    /// A projectile left its owner
    ProjectileSpawned {
        /// Owner
        entity_id: EntityId,
        /// Attack name
        attack: String,
    },
    /// A fighter lost health
    Damaged {
        /// Fighter hit
        entity_id: EntityId,
        /// Damage taken
        amount: i32,
        /// Health remaining
        remaining: i32,
    },
    /// A fighter regained health
    Healed {
        /// Fighter healed
        entity_id: EntityId,
        /// Health restored
        amount: i32,
    },
    /// A fighter was stunned
    Stunned {
        /// Fighter stunned
        entity_id: EntityId,
        /// Stun duration in frames
        frames: u32,
    },
    /// A fighter jumped
    Jumped {
        /// Fighter
        entity_id: EntityId,
    },
    /// A boss used its special attack
    SpecialAttack {
        /// Boss
        entity_id: EntityId,
        /// Special name
        special: String,
    },
    /// A fighter's health reached zero
    Defeated {
        /// Fighter
        entity_id: EntityId,
    },
}

/// Event bus collecting combat notifications.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: CombatEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender(Some(self.sender.clone()))
    }
}

/// Publishing handle held by fighters.
///
/// A silent handle discards everything, which is what tests and headless
/// tools without listeners use.
#[derive(Debug, Clone, Default)]
pub struct EventSender(Option<Sender<CombatEvent>>);

impl EventSender {
    /// Creates a handle that drops every event.
    #[must_use]
    pub const fn silent() -> Self {
        Self(None)
    }

    /// Publishes an event without blocking.
    pub fn publish(&self, event: CombatEvent) {
        if let Some(sender) = &self.0 {
            let _ = sender.try_send(event);
        }
    }

    /// Returns whether events go anywhere.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.0.is_some()
    }
}
