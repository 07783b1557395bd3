use crate::config::{ContentFileConfig, LoadoutEntry};
use crate::CatalogError;
use encounter_core::content::{ContentProvider, EnemyRecord, ItemRecord};
use encounter_core::stat_block::Consumables;
use encounter_core::types::ClassTag;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A class loadout waiting for item validation
#[derive(Debug)]
struct Loadout {
    entries: Vec<LoadoutEntry>,
    path: PathBuf,
}

/// Registry of all content, loaded from TOML files
#[derive(Debug, Default)]
pub struct ContentRegistry {
    enemies: Vec<EnemyRecord>,
    items: Vec<ItemRecord>,
    loadouts: BTreeMap<ClassTag, Loadout>,
    /// Where each enemy/item key was defined, for duplicate reports
    sources: HashMap<String, PathBuf>,
}

impl ContentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all content from a directory (recursively) and check loadouts
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let mut registry = Self::new();
        registry.load_dir(dir)?;
        registry.validate_loadouts()?;
        tracing::info!(
            dir = %dir.display(),
            enemies = registry.enemies.len(),
            items = registry.items.len(),
            loadouts = registry.loadouts.len(),
            "content loaded"
        );
        Ok(registry)
    }

    /// Load files from a directory recursively, in sorted path order
    fn load_dir(&mut self, dir: &Path) -> Result<(), CatalogError> {
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "content directory does not exist");
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| CatalogError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CatalogError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            paths.push(entry.path());
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    /// Load a single content file
    fn load_file(&mut self, path: &Path) -> Result<(), CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let config: ContentFileConfig = toml::from_str(&content).map_err(|e| CatalogError::Parse {
            error: e,
            path: path.to_path_buf(),
        })?;

        self.add_file(config, path)
    }

    /// Merge one parsed file into the registry
    pub fn add_file(&mut self, config: ContentFileConfig, path: &Path) -> Result<(), CatalogError> {
        let invalid = |message: String| CatalogError::Validation {
            message,
            path: path.to_path_buf(),
        };

        for enemy in config.enemies {
            enemy.validate().map_err(invalid)?;
            self.claim(format!("enemy:{}", enemy.name), path)?;
            self.enemies.push(enemy.into_record());
        }

        for item in config.items {
            item.validate().map_err(invalid)?;
            self.claim(format!("item:{}", item.id), path)?;
            self.items.push(item.into_record());
        }

        for loadout in config.loadouts {
            let class: ClassTag = loadout.class.parse().map_err(|e| invalid(format!("loadout: {}", e)))?;
            if let Some(existing) = self.loadouts.get(&class) {
                return Err(invalid(format!(
                    "duplicate loadout for class {} (first defined in '{}')",
                    class,
                    existing.path.display()
                )));
            }
            self.loadouts.insert(
                class,
                Loadout {
                    entries: loadout.items,
                    path: path.to_path_buf(),
                },
            );
        }

        tracing::debug!(path = %path.display(), "content file loaded");
        Ok(())
    }

    fn claim(&mut self, key: String, path: &Path) -> Result<(), CatalogError> {
        if let Some(first) = self.sources.get(&key) {
            return Err(CatalogError::Validation {
                message: format!("duplicate {} (first defined in '{}')", key, first.display()),
                path: path.to_path_buf(),
            });
        }
        self.sources.insert(key, path.to_path_buf());
        Ok(())
    }

    /// Every loadout entry must name a catalog item
    fn validate_loadouts(&self) -> Result<(), CatalogError> {
        for (class, loadout) in &self.loadouts {
            for entry in &loadout.entries {
                if self.item(entry.id()).is_none() {
                    return Err(CatalogError::Validation {
                        message: format!("loadout for {} references unknown item '{}'", class, entry.id()),
                        path: loadout.path.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Starting inventory for a class; empty when no loadout is defined
    pub fn starting_inventory(&self, class: ClassTag) -> Consumables {
        let mut consumables = Consumables::new();
        if let Some(loadout) = self.loadouts.get(&class) {
            for entry in &loadout.entries {
                consumables.insert(entry.id(), entry.count());
            }
        }
        consumables
    }

    /// List all enemy names
    pub fn enemy_names(&self) -> impl Iterator<Item = &str> {
        self.enemies.iter().map(|e| e.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty() && self.items.is_empty()
    }
}

impl ContentProvider for ContentRegistry {
    fn enemies(&self) -> &[EnemyRecord] {
        &self.enemies
    }

    fn items(&self) -> &[ItemRecord] {
        &self.items
    }
}
