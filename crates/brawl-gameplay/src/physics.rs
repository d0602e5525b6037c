//! Fighter body physics with platform collision.
//!
//! This module provides the integration and collision stages of the
//! per-frame pipeline: gravity, velocity integration, first-match platform
//! landing, drop-through suppression, and world boundary clamping.

use brawl_common::Rect;
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Number of frames a drop-through ignores non-ground platforms.
pub const DROP_THROUGH_FRAMES: u32 = 15;

/// Physics tuning shared by every fighter in a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration per frame (positive = down)
    pub gravity: f32,
    /// Terminal falling speed
    pub max_fall_speed: f32,
    /// How far below a surface the feet may be and still land
    pub landing_band: i32,
    /// Frames of drop-through suppression
    pub drop_through_frames: u32,
    /// Pixels a drop-through pushes the body down
    pub drop_nudge: i32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            max_fall_speed: 15.0,
            landing_band: 16,
            drop_through_frames: DROP_THROUGH_FRAMES,
            drop_nudge: 5,
        }
    }
}

/// Playable area. The floor acts as an implicit landing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Width in pixels
    pub width: i32,
    /// Y coordinate of the floor
    pub floor: i32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 1280,
            floor: 720,
        }
    }
}

impl WorldBounds {
    /// Creates world bounds.
    #[must_use]
    pub const fn new(width: i32, floor: i32) -> Self {
        Self { width, floor }
    }

    /// Checks whether a point has left the playable area.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width as f32 && y <= self.floor as f32 && y >= -(self.floor as f32)
    }
}

/// Physical state of a fighter.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Position and size in pixels
    pub rect: Rect,
    /// Horizontal velocity
    pub vx: f32,
    /// Vertical velocity (positive = down)
    pub vy: f32,
    on_ground: bool,
    drop_timer: u32,
}

impl Body {
    /// Creates a body at rest.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            vx: 0.0,
            vy: 0.0,
            on_ground: false,
            drop_timer: 0,
        }
    }

    /// Returns whether the body ended the last collision stage supported.
    #[must_use]
    pub const fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    /// Returns whether non-ground platforms are currently ignored.
    #[must_use]
    pub const fn is_dropping_through(&self) -> bool {
        self.drop_timer > 0
    }

    /// Remaining drop-through frames.
    #[must_use]
    pub const fn drop_timer(&self) -> u32 {
        self.drop_timer
    }

    /// Teleports the body and clears all motion state.
    pub fn place(&mut self, x: i32, y: i32) {
        self.rect.x = x;
        self.rect.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.on_ground = false;
        self.drop_timer = 0;
    }

    /// Launches upward if supported.
    pub fn jump(&mut self, strength: f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vy = -strength;
        self.on_ground = false;
        true
    }

    /// Sets vertical velocity. An upward launch leaves the ground.
    pub fn launch(&mut self, vy: f32) {
        self.vy = vy;
        if vy < 0.0 {
            self.on_ground = false;
        }
    }

    /// Moves horizontally by a rounded amount, staying inside the world.
    pub fn shove(&mut self, dx: f32, bounds: &WorldBounds) {
        self.rect.x += dx.round() as i32;
        let max_x = (bounds.width - self.rect.w).max(0);
        self.rect.x = self.rect.x.clamp(0, max_x);
    }

    /// Starts falling through the platform underfoot.
    ///
    /// Only allowed while supported. Clears the supported flag immediately so
    /// the next platform scan already skips non-ground platforms.
    pub fn begin_drop_through(&mut self, config: &PhysicsConfig) -> bool {
        if !self.on_ground {
            return false;
        }
        self.drop_timer = config.drop_through_frames;
        self.rect.y += config.drop_nudge;
        self.on_ground = false;
        true
    }

    /// Applies gravity and moves by the current velocity.
    pub fn integrate(&mut self, config: &PhysicsConfig, gravity_mod: f32, speed_mod: f32) {
        self.vy += config.gravity * gravity_mod;
        if self.vy > config.max_fall_speed {
            self.vy = config.max_fall_speed;
        }
        self.rect.x += (self.vx * speed_mod).round() as i32;
        self.rect.y += self.vy.round() as i32;
    }

    /// Lands on the first platform that catches the body.
    ///
    /// Scans in slice order and stops at the first match, so platform order
    /// matters. Inactive platforms are skipped, and so are non-ground
    /// platforms while dropping through. Returns the index landed on.
    pub fn resolve_platforms(&mut self, platforms: &[Platform], config: &PhysicsConfig) -> Option<usize> {
        self.on_ground = false;
        let dropping = self.is_dropping_through();
        let mut landed = None;

        for (index, platform) in platforms.iter().enumerate() {
            if !platform.is_active() || (dropping && !platform.is_ground()) {
                continue;
            }
            if platform.catches(&self.rect, self.vy, config.landing_band) {
                self.rect.y = platform.surface_y() - self.rect.h;
                self.vy = 0.0;
                self.on_ground = true;
                landed = Some(index);
                break;
            }
        }

        // Counted per scan so a full window skips exactly that many scans
        self.drop_timer = self.drop_timer.saturating_sub(1);
        landed
    }

    /// Keeps the body inside the world. Reaching the floor counts as landing.
    pub fn clamp_to_world(&mut self, bounds: &WorldBounds) {
        let max_x = (bounds.width - self.rect.w).max(0);
        self.rect.x = self.rect.x.clamp(0, max_x);

        if self.rect.bottom() >= bounds.floor && self.vy >= 0.0 {
            self.rect.y = bounds.floor - self.rect.h;
            self.vy = 0.0;
            self.on_ground = true;
        }
    }

    /// Runs integration, platform collision, and boundary clamping in order.
    pub fn step(
        &mut self,
        platforms: &[Platform],
        config: &PhysicsConfig,
        bounds: &WorldBounds,
        gravity_mod: f32,
        speed_mod: f32,
    ) {
        self.integrate(config, gravity_mod, speed_mod);
        self.resolve_platforms(platforms, config);
        self.clamp_to_world(bounds);
    }
}
