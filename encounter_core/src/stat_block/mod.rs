//! StatBlock - the numeric state of one combatant
//!
//! Fields are private so the health/resource bounds always hold; the
//! mutators clamp rather than fail, except [`StatBlock::consume`].

mod consumables;

pub use consumables::Consumables;

use crate::config::constants;
use crate::content::EnemyRecord;
use crate::error::EncounterError;
use crate::status::PoisonStatus;
use crate::types::ClassTag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    name: String,
    health: u32,
    max_health: u32,
    resource: u32,
    max_resource: u32,
    damage_rating: u32,
    /// Percentage mitigation and flat reduction, 0-100
    armor_rating: u32,
    /// Persistent attack multiplier; only ever grows
    damage_modifier: f64,
    class_tag: Option<ClassTag>,
    poison: Option<PoisonStatus>,
    consumables: Consumables,
}

impl StatBlock {
    /// A classless combatant at full health
    pub fn new(name: impl Into<String>, max_health: u32) -> Self {
        let max_health = max_health.max(1);
        StatBlock {
            name: name.into(),
            health: max_health,
            max_health,
            resource: 0,
            max_resource: 0,
            damage_rating: 0,
            armor_rating: 0,
            damage_modifier: 1.0,
            class_tag: None,
            poison: None,
            consumables: Consumables::new(),
        }
    }

    /// A fresh player of the given class, using the class profile table
    pub fn for_class(class: ClassTag) -> Self {
        let profile = constants().classes.profile(class);
        let mut block = StatBlock::new(class.to_string(), profile.max_health)
            .with_resource(profile.max_resource)
            .with_damage_rating(profile.damage_rating)
            .with_armor_rating(profile.armor_rating);
        block.class_tag = Some(class);
        block
    }

    // === Builders ===

    /// Set the resource pool (full)
    pub fn with_resource(mut self, max_resource: u32) -> Self {
        self.max_resource = max_resource;
        self.resource = max_resource;
        self
    }

    /// Set current health, clamped to `max_health`
    pub fn with_health(mut self, health: u32) -> Self {
        self.health = health.min(self.max_health);
        self
    }

    pub fn with_damage_rating(mut self, damage_rating: u32) -> Self {
        self.damage_rating = damage_rating;
        self
    }

    /// Set armor, clamped to 100
    pub fn with_armor_rating(mut self, armor_rating: u32) -> Self {
        self.armor_rating = armor_rating.min(100);
        self
    }

    /// Set the starting damage modifier (negative values become 0)
    pub fn with_damage_modifier(mut self, damage_modifier: f64) -> Self {
        self.damage_modifier = damage_modifier.max(0.0);
        self
    }

    pub fn with_class(mut self, class: ClassTag) -> Self {
        self.class_tag = Some(class);
        self
    }

    pub fn with_consumables(mut self, consumables: Consumables) -> Self {
        self.consumables = consumables;
        self
    }

    // === Accessors ===

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn resource(&self) -> u32 {
        self.resource
    }

    pub fn max_resource(&self) -> u32 {
        self.max_resource
    }

    pub fn damage_rating(&self) -> u32 {
        self.damage_rating
    }

    pub fn armor_rating(&self) -> u32 {
        self.armor_rating
    }

    pub fn damage_modifier(&self) -> f64 {
        self.damage_modifier
    }

    pub fn class_tag(&self) -> Option<ClassTag> {
        self.class_tag
    }

    pub fn poison(&self) -> Option<PoisonStatus> {
        self.poison
    }

    pub fn is_poisoned(&self) -> bool {
        self.poison.is_some()
    }

    pub fn consumables(&self) -> &Consumables {
        &self.consumables
    }

    /// Mutable inventory view for the owning collaborator (loot pickup, shops)
    pub fn consumables_mut(&mut self) -> &mut Consumables {
        &mut self.consumables
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    // === Mutators ===

    /// Subtract health, stopping at 0. Returns whether the combatant is now defeated.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.is_defeated()
    }

    /// Add health up to the maximum. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    /// Shift the resource pool, clamped to `[0, max_resource]`
    pub fn adjust_resource(&mut self, delta: i64) {
        let next = (self.resource as i64)
            .saturating_add(delta)
            .clamp(0, self.max_resource as i64);
        self.resource = next as u32;
    }

    /// Spend one copy of an item
    pub fn consume(&mut self, item: &str) -> Result<(), EncounterError> {
        self.consumables.consume(item)
    }

    /// Grow the damage modifier. Negative steps are ignored.
    pub fn raise_damage_modifier(&mut self, step: f64) {
        if step > 0.0 {
            self.damage_modifier += step;
        }
    }

    pub(crate) fn set_poison(&mut self, poison: Option<PoisonStatus>) {
        self.poison = poison;
    }
}

/// An opponent instantiated from an [`EnemyRecord`] for one encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opponent {
    stats: StatBlock,
    damage_factor: f64,
}

impl Opponent {
    pub fn new(stats: StatBlock, damage_factor: f64) -> Self {
        Opponent {
            stats,
            damage_factor: damage_factor.max(0.0),
        }
    }

    pub fn from_record(record: &EnemyRecord) -> Self {
        Opponent {
            stats: StatBlock::new(record.name.clone(), record.base_health),
            damage_factor: record.base_damage_factor.max(0.0),
        }
    }

    pub fn name(&self) -> &str {
        self.stats.name()
    }

    /// Multiplier applied to the opponent's counter-attack roll
    pub fn damage_factor(&self) -> f64 {
        self.damage_factor
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HEALTH_POTION;

    #[test]
    fn test_class_starting_stats() {
        let warrior = StatBlock::for_class(ClassTag::Warrior);
        assert_eq!(warrior.max_health(), 120);
        assert_eq!(warrior.health(), 120);
        assert_eq!(warrior.damage_rating(), 15);
        assert_eq!(warrior.armor_rating(), 10);
        assert_eq!(warrior.max_resource(), 0);

        let mage = StatBlock::for_class(ClassTag::Mage);
        assert_eq!(mage.max_health(), 80);
        assert_eq!(mage.resource(), 120);

        let rogue = StatBlock::for_class(ClassTag::Rogue);
        assert_eq!(rogue.class_tag(), Some(ClassTag::Rogue));
        assert!((rogue.damage_modifier() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_damage_clamps_at_zero() {
        let mut block = StatBlock::new("dummy", 30);
        assert!(!block.apply_damage(10));
        assert_eq!(block.health(), 20);
        assert!(block.apply_damage(500));
        assert_eq!(block.health(), 0);
        assert!(block.is_defeated());
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut block = StatBlock::new("dummy", 50).with_health(45);
        assert_eq!(block.heal(20), 5);
        assert_eq!(block.health(), 50);
    }

    #[test]
    fn test_adjust_resource_clamps_both_ends() {
        let mut mage = StatBlock::for_class(ClassTag::Mage);
        mage.adjust_resource(-500);
        assert_eq!(mage.resource(), 0);
        mage.adjust_resource(30);
        assert_eq!(mage.resource(), 30);
        mage.adjust_resource(1_000);
        assert_eq!(mage.resource(), 120);

        let mut warrior = StatBlock::for_class(ClassTag::Warrior);
        warrior.adjust_resource(10);
        assert_eq!(warrior.resource(), 0);
    }

    #[test]
    fn test_adjust_resource_extreme_deltas() {
        let mut mage = StatBlock::for_class(ClassTag::Mage);
        mage.adjust_resource(-50);
        assert_eq!(mage.resource(), 70);
        mage.adjust_resource(i64::MAX);
        assert_eq!(mage.resource(), 120);
        mage.adjust_resource(i64::MIN);
        assert_eq!(mage.resource(), 0);
    }

    #[test]
    fn test_consume_missing_item() {
        let mut block = StatBlock::new("dummy", 10);
        let err = block.consume(HEALTH_POTION).unwrap_err();
        assert!(matches!(err, EncounterError::ItemNotAvailable(_)));
    }

    #[test]
    fn test_damage_modifier_never_decreases() {
        let mut block = StatBlock::new("dummy", 10);
        block.raise_damage_modifier(0.2);
        block.raise_damage_modifier(-5.0);
        assert!((block.damage_modifier() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_builders_clamp() {
        let block = StatBlock::new("dummy", 0)
            .with_armor_rating(250)
            .with_damage_modifier(-1.0)
            .with_health(99);
        assert_eq!(block.max_health(), 1);
        assert_eq!(block.health(), 1);
        assert_eq!(block.armor_rating(), 100);
        assert_eq!(block.damage_modifier(), 0.0);
    }

    #[test]
    fn test_opponent_from_record() {
        let record = EnemyRecord {
            name: "Goblin".to_string(),
            base_health: 30,
            base_damage_factor: 0.8,
            description: "Small and mean".to_string(),
        };
        let opponent = Opponent::from_record(&record);
        assert_eq!(opponent.name(), "Goblin");
        assert_eq!(opponent.stats().health(), 30);
        assert_eq!(opponent.stats().class_tag(), None);
        assert!((opponent.damage_factor() - 0.8).abs() < f64::EPSILON);
    }
}
