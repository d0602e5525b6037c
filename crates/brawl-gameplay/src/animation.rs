//! Animation playback contract consumed by the combat core.
//!
//! The renderer owns sprites; the simulation only needs to know which clip
//! is playing, which frame it is on, and whether it has finished. Gated
//! attack effects are keyed off those answers.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback handle the core drives and queries every tick.
pub trait Animator: fmt::Debug {
    /// Checks whether a clip with this name exists.
    fn has_animation(&self, name: &str) -> bool;

    /// Switches to a clip. Does nothing if it is already the current clip.
    fn set_animation(&mut self, name: &str);

    /// Switches to a clip and always restarts it from frame 0.
    fn set_animation_forced(&mut self, name: &str);

    /// Returns the frame index of the current clip.
    fn current_frame(&self) -> usize;

    /// Returns whether a non-looping clip has played its last frame.
    fn is_animation_complete(&self) -> bool;

    /// Returns the current clip name, if any.
    fn current_animation(&self) -> Option<&str>;

    /// Advances playback by one simulation tick.
    fn advance(&mut self);
}

/// A named clip: frame count and playback rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    /// Clip name
    pub name: String,
    /// Number of frames
    pub frames: usize,
    /// Simulation ticks each frame is shown for
    #[serde(default = "default_ticks_per_frame")]
    pub ticks_per_frame: u32,
    /// Whether the clip wraps around instead of completing
    #[serde(default)]
    pub looping: bool,
}

const fn default_ticks_per_frame() -> u32 {
    1
}

impl Clip {
    /// Creates a one-shot clip shown at one frame per tick.
    #[must_use]
    pub fn once(name: impl Into<String>, frames: usize) -> Self {
        Self {
            name: name.into(),
            frames: frames.max(1),
            ticks_per_frame: 1,
            looping: false,
        }
    }

    /// Creates a looping clip shown at one frame per tick.
    #[must_use]
    pub fn looping(name: impl Into<String>, frames: usize) -> Self {
        Self {
            looping: true,
            ..Self::once(name, frames)
        }
    }

    /// Sets the playback rate.
    #[must_use]
    pub fn with_ticks_per_frame(mut self, ticks: u32) -> Self {
        self.ticks_per_frame = ticks.max(1);
        self
    }
}

/// Frame counter implementation of [`Animator`] with no sprites attached.
///
/// Headless runs and tests use it in place of the renderer's sprite player.
#[derive(Debug, Clone, Default)]
pub struct ClipPlayer {
    clips: AHashMap<String, Clip>,
    current: Option<String>,
    frame: usize,
    tick: u32,
    finished: bool,
}

impl ClipPlayer {
    /// Creates a player with no clips.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a player from a clip list.
    #[must_use]
    pub fn with_clips(clips: impl IntoIterator<Item = Clip>) -> Self {
        let mut player = Self::new();
        for clip in clips {
            player.add_clip(clip);
        }
        player
    }

    /// Registers or replaces a clip.
    pub fn add_clip(&mut self, clip: Clip) {
        self.clips.insert(clip.name.clone(), clip);
    }

    fn restart(&mut self, name: &str) {
        self.current = Some(name.to_string());
        self.frame = 0;
        self.tick = 0;
        self.finished = false;
    }
}

impl Animator for ClipPlayer {
    fn has_animation(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    fn set_animation(&mut self, name: &str) {
        if self.current.as_deref() == Some(name) || !self.has_animation(name) {
            return;
        }
        self.restart(name);
    }

    fn set_animation_forced(&mut self, name: &str) {
        if self.has_animation(name) {
            self.restart(name);
        }
    }

    fn current_frame(&self) -> usize {
        self.frame
    }

    fn is_animation_complete(&self) -> bool {
        self.finished
    }

    fn current_animation(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn advance(&mut self) {
        if self.finished {
            return;
        }
        let Some((frames, ticks_per_frame, looping)) = self
            .current
            .as_ref()
            .and_then(|name| self.clips.get(name))
            .map(|clip| (clip.frames, clip.ticks_per_frame, clip.looping))
        else {
            return;
        };

        self.tick += 1;
        if self.tick < ticks_per_frame {
            return;
        }
        self.tick = 0;

        if self.frame + 1 < frames {
            self.frame += 1;
        } else if looping {
            self.frame = 0;
        } else {
            self.finished = true;
        }
    }
}
