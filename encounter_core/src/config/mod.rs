//! Configuration loading
//!
//! Balancing numbers live in [`EncounterConstants`], loaded once from TOML and
//! shared through a global. Everything falls back to the built-in defaults when
//! no file is given.

mod classes;
mod constants;

pub use classes::{ClassProfile, ClassTable};
pub use constants::{
    constants, constants_initialized, init_constants, init_constants_default, CombatConstants,
    EncounterConstants, EncounterTuning, ItemConstants, PoisonConstants, RollRange, TrapConstants,
};

use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

/// Error loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Read and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_toml(&content)
}

/// Deserialize a TOML string
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(content)?)
}
