//! Per-fighter attack registry.
//!
//! Attacks are registered by unique name. The manager dispatches named or
//! primary attacks, ticks every attack each frame, and runs the projectile
//! and lingering-hazard collision passes.

use ahash::AHashMap;
use brawl_common::EntityId;
use tracing::{debug, warn};

use crate::attack::{Attack, AttackKind, AttackOrigin, AttackVisual, Damageable};

/// Registry of a fighter's attacks.
#[derive(Debug)]
pub struct AttackManager {
    /// Fighter that owns these attacks
    owner: EntityId,
    /// Attacks in registration order
    attacks: Vec<Box<dyn Attack>>,
    /// Name to slot lookup
    index: AHashMap<String, usize>,
    /// Shortcut for the main melee ability
    primary_melee: Option<String>,
    /// Shortcut for the main projectile ability
    primary_ranged: Option<String>,
}

impl AttackManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            attacks: Vec::new(),
            index: AHashMap::new(),
            primary_melee: None,
            primary_ranged: None,
        }
    }

    /// Owner of the attacks.
    #[must_use]
    pub const fn owner(&self) -> EntityId {
        self.owner
    }

    /// Number of registered attacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    /// Returns whether no attacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Registers an attack under its own name.
    ///
    /// An attack with the same name is replaced.
    pub fn register(&mut self, attack: Box<dyn Attack>) {
        let name = attack.name().to_string();
        if let Some(&slot) = self.index.get(&name) {
            warn!("Attack '{}' registered twice for {}, replacing", name, self.owner);
            self.attacks[slot] = attack;
            return;
        }
        self.index.insert(name, self.attacks.len());
        self.attacks.push(attack);
    }

    /// Marks a registered attack as the primary melee. Returns false if unknown.
    pub fn set_primary_melee(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.primary_melee = Some(name.to_string());
        true
    }

    /// Marks a registered attack as the primary ranged. Returns false if unknown.
    pub fn set_primary_ranged(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.primary_ranged = Some(name.to_string());
        true
    }

    /// Name of the primary melee attack.
    #[must_use]
    pub fn primary_melee(&self) -> Option<&str> {
        self.primary_melee.as_deref()
    }

    /// Name of the primary ranged attack.
    #[must_use]
    pub fn primary_ranged(&self) -> Option<&str> {
        self.primary_ranged.as_deref()
    }

    /// Checks whether an attack is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attacks.iter().map(|a| a.name())
    }

    /// Looks up an attack.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Attack> {
        self.index.get(name).map(|&slot| self.attacks[slot].as_ref())
    }

    /// Looks up an attack mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Attack> {
        let slot = *self.index.get(name)?;
        Some(self.attacks[slot].as_mut() as &mut dyn Attack)
    }

    /// Ability family of a registered attack.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<AttackKind> {
        self.get(name).map(|a| a.kind())
    }

    /// Returns whether a registered attack is off cooldown. Unknown names are
    /// never usable.
    #[must_use]
    pub fn can_use(&self, name: &str) -> bool {
        self.get(name).is_some_and(|a| a.can_use())
    }

    /// Uses an attack immediately. Returns false, with no effect, if the name
    /// is unknown or the attack is cooling down.
    pub fn execute(
        &mut self,
        name: &str,
        origin: &AttackOrigin,
        targets: &mut [&mut dyn Damageable],
    ) -> bool {
        let Some(attack) = self.get_mut(name) else {
            return false;
        };
        let used = attack.execute(origin, targets);
        if used {
            debug!("{} used '{}'", origin.id, name);
        }
        used
    }

    /// Starts an attack's cooldown without applying its effect or opening
    /// its active window.
    ///
    /// Gated attacks call this when the swing begins and [`Self::fire`] on
    /// the trigger frame.
    pub fn start(&mut self, name: &str) -> bool {
        match self.get_mut(name) {
            Some(attack) if attack.can_use() => {
                attack.state_mut().start_cooldown();
                true
            }
            _ => false,
        }
    }

    /// Applies an attack's effect regardless of cooldown and opens its
    /// active window. Returns hits.
    pub fn fire(
        &mut self,
        name: &str,
        origin: &AttackOrigin,
        targets: &mut [&mut dyn Damageable],
    ) -> usize {
        self.get_mut(name).map_or(0, |attack| {
            attack.state_mut().activate();
            attack.apply(origin, targets)
        })
    }

    /// Ticks every attack. Runs every frame, stunned or not.
    pub fn update_all(&mut self) {
        for attack in &mut self.attacks {
            attack.update();
        }
    }

    /// Collects draw data for every attack. Never changes state.
    #[must_use]
    pub fn draw_all(&self, origin: &AttackOrigin) -> Vec<AttackVisual> {
        let mut out = Vec::new();
        for attack in &self.attacks {
            attack.visuals(origin, &mut out);
        }
        out
    }

    /// Runs projectile collisions for every projectile-capable attack.
    pub fn check_all_collisions(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        self.attacks
            .iter_mut()
            .filter_map(|a| a.as_projectiles())
            .map(|p| p.check_collisions(targets))
            .sum()
    }

    /// Resolves this frame's effect for every live lingering hazard.
    pub fn resolve_all_hazards(&mut self, targets: &mut [&mut dyn Damageable]) -> usize {
        self.attacks
            .iter_mut()
            .filter_map(|a| a.as_hazard())
            .filter(|h| h.is_live())
            .map(|h| h.resolve(targets))
            .sum()
    }

    /// Number of projectiles in flight across all attacks.
    pub fn projectile_count(&mut self) -> usize {
        self.attacks
            .iter_mut()
            .filter_map(|a| a.as_projectiles())
            .map(|p| p.projectiles().len())
            .sum()
    }

    /// Makes every attack ready and drops anything in flight.
    pub fn reset_all(&mut self) {
        for attack in &mut self.attacks {
            attack.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::test_support::*;
    use crate::attack::{MeleeAttack, ProjectileAttack};

    fn manager() -> AttackManager {
        let mut manager = AttackManager::new(EntityId::from_raw(1));
        manager.register(Box::new(MeleeAttack::new("slash", 10, 20, 50)));
        manager.register(Box::new(ProjectileAttack::new("bolt", 8, 30, 10.0)));
        manager
    }

    #[test]
    fn test_register_and_lookup() {
        let mut manager = manager();
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.kind("bolt"), Some(AttackKind::Projectile));
        assert!(manager.get("nope").is_none());
        assert!(!manager.set_primary_melee("nope"));
        assert!(manager.set_primary_melee("slash"));
        assert_eq!(manager.primary_melee(), Some("slash"));
        assert_eq!(manager.names().collect::<Vec<_>>(), vec!["slash", "bolt"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut manager = manager();
        manager.register(Box::new(MeleeAttack::new("slash", 99, 5, 10)));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.get("slash").map(|a| a.state().damage()), Some(99));
    }

    #[test]
    fn test_execute_unknown_or_cooling_down() {
        let mut manager = manager();
        let mut victim = Dummy::at(2, 150, 100);
        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];

        assert!(!manager.execute("nope", &origin(), &mut targets));
        assert!(manager.execute("slash", &origin(), &mut targets));
        assert!(!manager.execute("slash", &origin(), &mut targets));
        assert_eq!(victim.health, 90);
    }

    #[test]
    fn test_primary_ranged_slot() {
        let mut manager = manager();
        assert!(manager.primary_ranged().is_none());
        assert!(!manager.set_primary_ranged("nope"));
        assert!(manager.set_primary_ranged("bolt"));
        assert_eq!(manager.primary_ranged(), Some("bolt"));
    }

    #[test]
    fn test_update_all_ticks_every_attack() {
        let mut manager = manager();
        assert!(manager.start("slash"));
        assert!(manager.start("bolt"));
        assert!(!manager.start("slash"));
        for _ in 0..20 {
            manager.update_all();
        }
        assert!(manager.can_use("slash"));
        assert!(!manager.can_use("bolt"));
        for _ in 0..10 {
            manager.update_all();
        }
        assert!(manager.can_use("bolt"));
    }

    #[test]
    fn test_collisions_only_touch_projectiles() {
        let mut manager = manager();
        let mut none: [&mut dyn Damageable; 0] = [];
        manager.execute("bolt", &origin(), &mut none);

        // Victim overlaps both the melee hitbox and the fresh projectile
        let mut victim = Dummy::at(2, 140, 100);
        let mut targets: [&mut dyn Damageable; 1] = [&mut victim];
        assert_eq!(manager.check_all_collisions(&mut targets), 1);
        assert_eq!(victim.health, 92);
        assert_eq!(manager.projectile_count(), 0);
    }

    #[test]
    fn test_draw_all_is_read_only() {
        let mut manager = manager();
        let mut none: [&mut dyn Damageable; 0] = [];
        manager.execute("slash", &origin(), &mut none);
        manager.execute("bolt", &origin(), &mut none);

        let first = manager.draw_all(&origin());
        let second = manager.draw_all(&origin());
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_all() {
        let mut manager = manager();
        let mut none: [&mut dyn Damageable; 0] = [];
        manager.execute("slash", &origin(), &mut none);
        manager.execute("bolt", &origin(), &mut none);
        manager.reset_all();
        assert!(manager.can_use("slash"));
        assert!(manager.can_use("bolt"));
        assert_eq!(manager.projectile_count(), 0);
    }
}
