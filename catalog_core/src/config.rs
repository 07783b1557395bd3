use encounter_core::content::{EnemyRecord, ItemKind, ItemRecord};
use serde::Deserialize;

/// TOML layout of one content file
#[derive(Debug, Default, Deserialize)]
pub struct ContentFileConfig {
    #[serde(default, rename = "enemy")]
    pub enemies: Vec<EnemyConfig>,
    #[serde(default, rename = "item")]
    pub items: Vec<ItemConfig>,
    #[serde(default, rename = "loadout")]
    pub loadouts: Vec<LoadoutConfig>,
}

/// One enemy template
#[derive(Debug, Deserialize)]
pub struct EnemyConfig {
    pub name: String,
    pub health: u32,
    pub damage_factor: f64,
    #[serde(default)]
    pub description: String,
}

impl EnemyConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("enemy name must not be empty".to_string());
        }
        if self.health == 0 {
            return Err(format!("enemy '{}' must have positive health", self.name));
        }
        if !self.damage_factor.is_finite() || self.damage_factor < 0.0 {
            return Err(format!(
                "enemy '{}' damage_factor must be a non-negative number, got {}",
                self.name, self.damage_factor
            ));
        }
        Ok(())
    }

    pub fn into_record(self) -> EnemyRecord {
        EnemyRecord {
            name: self.name,
            base_health: self.health,
            base_damage_factor: self.damage_factor,
            description: self.description,
        }
    }
}

/// One catalog item
#[derive(Debug, Deserialize)]
pub struct ItemConfig {
    pub id: String,
    #[serde(default = "default_kind")]
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
}

fn default_kind() -> ItemKind {
    ItemKind::Other
}

impl ItemConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("item id must not be empty".to_string());
        }
        Ok(())
    }

    pub fn into_record(self) -> ItemRecord {
        ItemRecord {
            id: self.id.into(),
            kind: self.kind,
            description: self.description,
        }
    }
}

/// Starting inventory for one class
#[derive(Debug, Deserialize)]
pub struct LoadoutConfig {
    pub class: String,
    #[serde(default)]
    pub items: Vec<LoadoutEntry>,
}

/// A loadout entry can be a bare id or an id with a count
///
/// This allows `items = ["Rope"]` as well as `items = [{ id = "Health Potion", count = 2 }]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LoadoutEntry {
    Single(String),
    Counted { id: String, count: u32 },
}

impl LoadoutEntry {
    pub fn id(&self) -> &str {
        match self {
            LoadoutEntry::Single(id) => id,
            LoadoutEntry::Counted { id, .. } => id,
        }
    }

    pub fn count(&self) -> u32 {
        match self {
            LoadoutEntry::Single(_) => 1,
            LoadoutEntry::Counted { count, .. } => *count,
        }
    }
}
