//! Animation-frame gated effects.
//!
//! A gated attack starts its cooldown and forces an animation clip when it
//! begins, then releases its effect on specific frames of that clip. Each
//! trigger frame fires at most once per activation:
//!
//! ```text
//! Idle --begin--> Windup --trigger--> Triggered --last trigger--> Recovering
//!   ^                                                                  |
//!   +------------------------ clip complete ---------------------------+
//! ```
//!
//! A trigger fires only on the advance where the observed frame index
//! *changes to* exactly the trigger index. Advancing twice on the same frame
//! fires nothing the second time, and a trigger whose index is skipped by
//! playback never fires.

use brawl_common::EntityId;
use serde::{Deserialize, Serialize};

/// Which gated attack a fighter is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackSlot {
    /// Primary melee
    Melee,
    /// Primary ranged
    Ranged,
    /// Boss signature move
    Special,
}

impl AttackSlot {
    /// All slots in update order.
    pub const ALL: [Self; 3] = [Self::Melee, Self::Ranged, Self::Special];
}

/// Binds an attack to the clip that plays it and its trigger frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSpec {
    /// Registered attack name
    pub attack: String,
    /// Animation clip forced when the attack begins
    pub clip: String,
    /// Frame indices that release the effect, one pulse each
    pub trigger_frames: Vec<usize>,
}

impl GateSpec {
    /// Creates a gate spec.
    #[must_use]
    pub fn new(attack: impl Into<String>, clip: impl Into<String>, trigger_frames: &[usize]) -> Self {
        Self {
            attack: attack.into(),
            clip: clip.into(),
            trigger_frames: trigger_frames.to_vec(),
        }
    }
}

/// Progress of a gated attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GatePhase {
    /// No attack in progress
    #[default]
    Idle,
    /// Clip playing, no trigger reached yet
    Windup,
    /// At least one trigger fired, more to come
    Triggered,
    /// Every trigger fired, waiting for the clip to finish
    Recovering,
}

/// Per-slot state machine releasing an attack's effect on trigger frames.
#[derive(Debug, Clone)]
pub struct ActionGate {
    spec: GateSpec,
    phase: GatePhase,
    fired: Vec<bool>,
    last_frame: Option<usize>,
    targets: Vec<EntityId>,
}

impl ActionGate {
    /// Creates an idle gate.
    #[must_use]
    pub fn new(spec: GateSpec) -> Self {
        let fired = vec![false; spec.trigger_frames.len()];
        Self {
            spec,
            phase: GatePhase::Idle,
            fired,
            last_frame: None,
            targets: Vec::new(),
        }
    }

    /// Gate configuration.
    #[must_use]
    pub fn spec(&self) -> &GateSpec {
        &self.spec
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GatePhase {
        self.phase
    }

    /// Returns whether an activation is in progress.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.phase != GatePhase::Idle
    }

    /// Targets captured when the activation began.
    #[must_use]
    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    /// Starts an activation with a target snapshot. Refused while busy.
    pub fn begin(&mut self, targets: Vec<EntityId>) -> bool {
        if self.is_busy() {
            return false;
        }
        self.phase = GatePhase::Windup;
        self.fired.iter_mut().for_each(|f| *f = false);
        self.last_frame = None;
        self.targets = targets;
        true
    }

    /// Observes the animation for this tick.
    ///
    /// `clip` is the animation currently playing. If it is no longer the
    /// gate's clip the activation ends without firing. Returns the indices
    /// (into the trigger list) that fired on this advance.
    pub fn advance(&mut self, clip: Option<&str>, frame: usize, complete: bool) -> Vec<usize> {
        let mut fired_now = Vec::new();
        if !self.is_busy() {
            return fired_now;
        }
        if clip != Some(self.spec.clip.as_str()) {
            self.finish();
            return fired_now;
        }

        if self.last_frame != Some(frame) {
            self.last_frame = Some(frame);
            for (i, &trigger) in self.spec.trigger_frames.iter().enumerate() {
                if trigger == frame && !self.fired[i] {
                    self.fired[i] = true;
                    fired_now.push(i);
                }
            }
            if !fired_now.is_empty() {
                self.phase = if self.fired.iter().all(|&f| f) {
                    GatePhase::Recovering
                } else {
                    GatePhase::Triggered
                };
            }
        }

        if complete {
            self.finish();
        }
        fired_now
    }

    /// Drops the activation without firing anything else.
    pub fn cancel(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.phase = GatePhase::Idle;
        self.last_frame = None;
        self.targets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(triggers: &[usize]) -> ActionGate {
        ActionGate::new(GateSpec::new("slash", "attack", triggers))
    }

    #[test]
    fn test_fires_once_on_trigger_frame() {
        let mut g = gate(&[5]);
        assert!(g.begin(vec![EntityId::from_raw(2)]));

        for frame in 0..5 {
            assert!(g.advance(Some("attack"), frame, false).is_empty());
            assert_eq!(g.phase(), GatePhase::Windup);
        }
        assert_eq!(g.advance(Some("attack"), 5, false), vec![0]);
        assert_eq!(g.phase(), GatePhase::Recovering);

        // Same frame observed again, then later frames
        assert!(g.advance(Some("attack"), 5, false).is_empty());
        for frame in 6..10 {
            assert!(g.advance(Some("attack"), frame, false).is_empty());
        }
        assert!(g.is_busy());

        g.advance(Some("attack"), 9, true);
        assert!(!g.is_busy());
        assert!(g.targets().is_empty());
    }

    #[test]
    fn test_two_triggers_latch_independently() {
        let mut g = gate(&[2, 6]);
        g.begin(Vec::new());
        let mut fired = Vec::new();
        for frame in 0..8 {
            fired.extend(g.advance(Some("attack"), frame, false));
            if frame == 3 {
                assert_eq!(g.phase(), GatePhase::Triggered);
            }
        }
        assert_eq!(fired, vec![0, 1]);
        assert_eq!(g.phase(), GatePhase::Recovering);
    }

    #[test]
    fn test_skipped_trigger_never_fires() {
        let mut g = gate(&[3]);
        g.begin(Vec::new());
        for frame in [0, 2, 4, 6] {
            assert!(g.advance(Some("attack"), frame, false).is_empty());
        }
        g.advance(Some("attack"), 6, true);
        assert!(!g.is_busy());
    }

    #[test]
    fn test_refuses_while_busy_and_rearms() {
        let mut g = gate(&[0]);
        assert!(g.begin(vec![EntityId::from_raw(7)]));
        assert!(!g.begin(Vec::new()));
        assert_eq!(g.targets(), &[EntityId::from_raw(7)]);

        assert_eq!(g.advance(Some("attack"), 0, true), vec![0]);
        assert!(g.begin(Vec::new()));
        assert_eq!(g.advance(Some("attack"), 0, false), vec![0]);
    }

    #[test]
    fn test_clip_change_cancels_without_firing() {
        let mut g = gate(&[4]);
        g.begin(Vec::new());
        g.advance(Some("attack"), 0, false);
        assert!(g.advance(Some("hurt"), 4, false).is_empty());
        assert!(!g.is_busy());
    }

    #[test]
    fn test_idle_gate_ignores_frames() {
        let mut g = gate(&[0]);
        assert!(g.advance(Some("attack"), 0, false).is_empty());
    }
}
