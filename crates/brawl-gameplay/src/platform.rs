//! Static platforms that fighters land on.

use brawl_common::Rect;

/// An axis-aligned surface fighters can stand on.
///
/// Platforms are immutable once built. The landing plane (`surface_y`) is
/// derived from the top edge at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    bounds: Rect,
    surface_y: i32,
    active: bool,
    is_ground: bool,
}

impl Platform {
    /// Creates an active, pass-through platform.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            bounds: Rect::new(x, y, w, h),
            surface_y: y,
            active: true,
            is_ground: false,
        }
    }

    /// Creates the bottom-most platform, which drop-through never skips.
    #[must_use]
    pub const fn ground(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            bounds: Rect::new(x, y, w, h),
            surface_y: y,
            active: true,
            is_ground: true,
        }
    }

    /// Builds the platform in an inactive state.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns the platform rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Returns the Y coordinate fighters snap their feet to.
    #[must_use]
    pub const fn surface_y(&self) -> i32 {
        self.surface_y
    }

    /// Returns whether collision queries consider this platform.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether this is the ground platform.
    #[must_use]
    pub const fn is_ground(&self) -> bool {
        self.is_ground
    }

    /// Checks whether a falling body should land on this platform.
    ///
    /// Lands when the horizontal spans overlap, the body is not moving up, and
    /// its lower edge is within `band` pixels below the surface plane.
    #[must_use]
    pub fn catches(&self, body: &Rect, vy: f32, band: i32) -> bool {
        if vy < 0.0 || !self.bounds.overlaps_horizontally(body) {
            return false;
        }
        let feet = body.bottom();
        feet >= self.surface_y && feet <= self.surface_y + band
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_is_top_edge() {
        let p = Platform::new(100, 400, 200, 20);
        assert_eq!(p.surface_y(), 400);
        assert!(p.is_active());
        assert!(!p.is_ground());
        assert!(Platform::ground(0, 600, 800, 40).is_ground());
        assert!(!p.clone().inactive().is_active());
    }

    #[test]
    fn test_catches_within_band() {
        let p = Platform::new(100, 400, 200, 20);
        // Feet exactly on the surface
        assert!(p.catches(&Rect::new(150, 350, 40, 50), 0.0, 16));
        // Feet slightly below the surface
        assert!(p.catches(&Rect::new(150, 360, 40, 50), 3.0, 16));
        // Too deep below the surface
        assert!(!p.catches(&Rect::new(150, 380, 40, 50), 3.0, 16));
        // Still above the surface
        assert!(!p.catches(&Rect::new(150, 340, 40, 50), 3.0, 16));
    }

    #[test]
    fn test_no_catch_while_rising_or_outside() {
        let p = Platform::new(100, 400, 200, 20);
        assert!(!p.catches(&Rect::new(150, 355, 40, 50), -4.0, 16));
        assert!(!p.catches(&Rect::new(400, 355, 40, 50), 2.0, 16));
    }
}
