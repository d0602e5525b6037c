//! # Brawl Gameplay
//!
//! Combat simulation for Project Brawl.
//!
//! This crate provides the fixed-step fighting core:
//! - Platforms and fighter physics
//! - Attack types, per-fighter attack managers, animation-gated effects
//! - Fighters, players, bosses and boss AI strategies
//! - Character profiles and rosters
//! - The arena that orders intents, updates and hit checks each frame
//! - Event bus for audio and render notifications

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ai;
pub mod animation;
pub mod arena;
pub mod attack;
pub mod attack_manager;
pub mod boss;
pub mod events;
pub mod fighter;
pub mod gate;
pub mod input;
pub mod physics;
pub mod platform;
pub mod player;
pub mod profile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ai::*;
    pub use crate::animation::*;
    pub use crate::arena::*;
    pub use crate::attack::*;
    pub use crate::attack_manager::*;
    pub use crate::boss::*;
    pub use crate::events::*;
    pub use crate::fighter::*;
    pub use crate::gate::*;
    pub use crate::input::*;
    pub use crate::physics::*;
    pub use crate::platform::*;
    pub use crate::player::*;
    pub use crate::profile::*;
}

pub use prelude::*;
