//! Content seam - item and enemy data owned by an external collaborator
//!
//! The engine only reads content: it asks for the enemy pool when spawning an
//! encounter and for the item catalog when granting or using items.

use crate::error::{EncounterError, EntityKind};
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// Broad item category, used to decide whether an item can be used up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Consumable,
    Tool,
    Weapon,
    Armor,
    Accessory,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
}

/// Read-only enemy template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub name: String,
    pub base_health: u32,
    pub base_damage_factor: f64,
    #[serde(default)]
    pub description: String,
}

/// Source of enemy and item data
pub trait ContentProvider {
    /// Every enemy that can appear in an encounter, in a stable order
    fn enemies(&self) -> &[EnemyRecord];

    /// The global item catalog, in a stable order
    fn items(&self) -> &[ItemRecord];

    fn item(&self, id: &str) -> Option<&ItemRecord> {
        self.items().iter().find(|item| item.id.as_str() == id)
    }

    fn item_kind(&self, id: &str) -> Result<ItemKind, EncounterError> {
        self.item(id)
            .map(|item| item.kind)
            .ok_or_else(|| EncounterError::unknown(EntityKind::Item, id))
    }

    fn enemy(&self, name: &str) -> Result<&EnemyRecord, EncounterError> {
        self.enemies()
            .iter()
            .find(|enemy| enemy.name == name)
            .ok_or_else(|| EncounterError::unknown(EntityKind::Enemy, name))
    }
}

/// Content held directly in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryContent {
    enemies: Vec<EnemyRecord>,
    items: Vec<ItemRecord>,
}

impl InMemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enemy(mut self, name: impl Into<String>, base_health: u32, base_damage_factor: f64) -> Self {
        self.enemies.push(EnemyRecord {
            name: name.into(),
            base_health,
            base_damage_factor,
            description: String::new(),
        });
        self
    }

    pub fn with_item(mut self, id: impl Into<ItemId>, kind: ItemKind) -> Self {
        self.items.push(ItemRecord {
            id: id.into(),
            kind,
            description: String::new(),
        });
        self
    }
}

impl ContentProvider for InMemoryContent {
    fn enemies(&self) -> &[EnemyRecord] {
        &self.enemies
    }

    fn items(&self) -> &[ItemRecord] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HEALTH_POTION;

    #[test]
    fn test_lookups() {
        let content = InMemoryContent::new()
            .with_enemy("Goblin", 30, 0.8)
            .with_item(HEALTH_POTION, ItemKind::Consumable);

        assert_eq!(content.enemy("Goblin").unwrap().base_health, 30);
        assert_eq!(content.item_kind(HEALTH_POTION).unwrap(), ItemKind::Consumable);
    }

    #[test]
    fn test_unknown_keys() {
        let content = InMemoryContent::new();
        assert!(matches!(
            content.enemy("Dragon"),
            Err(EncounterError::UnknownEntity { kind: EntityKind::Enemy, .. })
        ));
        assert!(matches!(
            content.item_kind("Excalibur"),
            Err(EncounterError::UnknownEntity { kind: EntityKind::Item, .. })
        ));
    }
}
