//! # Brawl Common
//!
//! Common types, utilities, and shared abstractions for Project Brawl.
//!
//! This crate provides foundational types used across all Brawl crates:
//! - ID types (EntityId, Team)
//! - Integer-pixel geometry (Rect, Circle)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
        assert!(!EntityId::NULL.is_valid());
    }

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::Players.opponent(), Team::Bosses);
        assert_eq!(Team::Bosses.opponent(), Team::Players);
    }

    proptest! {
        #[test]
        fn rect_intersection_is_symmetric(
            ax in -500i32..500, ay in -500i32..500, aw in 1i32..200, ah in 1i32..200,
            bx in -500i32..500, by in -500i32..500, bw in 1i32..200, bh in 1i32..200,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }
    }
}
