//! Integer-pixel geometry shared by physics and hit tests.
//!
//! Screen convention: `x` grows to the right, `y` grows downward, so the
//! "bottom" of a rectangle is `y + h`.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Center point as floats.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.center().0
    }

    /// Checks if two rectangles overlap (touching edges do not count).
    #[must_use]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Checks if the horizontal spans overlap.
    #[must_use]
    pub const fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x
    }

    /// Returns the rectangle moved by an offset.
    #[must_use]
    pub const fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Circle with a float center, used by area bursts and projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    /// Center X
    pub x: f32,
    /// Center Y
    pub y: f32,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Creates a new circle.
    #[must_use]
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Checks if the circle overlaps a rectangle.
    ///
    /// Clamps the center onto the rectangle and compares the squared
    /// distance to the squared radius.
    #[must_use]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let nearest_x = self.x.clamp(rect.x as f32, rect.right() as f32);
        let nearest_y = self.y.clamp(rect.y as f32, rect.bottom() as f32);
        let dx = self.x - nearest_x;
        let dy = self.y - nearest_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Checks if a point lies inside the circle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Absolute horizontal distance between the centers of two rectangles.
#[must_use]
pub fn horizontal_distance(a: &Rect, b: &Rect) -> f32 {
    (a.center_x() - b.center_x()).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.center(), (25.0, 40.0));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        let touching = Rect::new(10, 0, 10, 10);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Rect::new(100, 100, 20, 20);
        assert!(Circle::new(95.0, 110.0, 6.0).intersects_rect(&rect));
        assert!(!Circle::new(80.0, 110.0, 6.0).intersects_rect(&rect));
        // Center inside the rectangle
        assert!(Circle::new(110.0, 110.0, 1.0).intersects_rect(&rect));
    }

    #[test]
    fn test_horizontal_distance() {
        let a = Rect::new(0, 0, 20, 20);
        let b = Rect::new(70, 300, 20, 20);
        assert_eq!(horizontal_distance(&a, &b), 70.0);
    }
}
