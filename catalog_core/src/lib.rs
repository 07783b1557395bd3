//! catalog_core - Content catalog loaded from a directory of TOML files
//!
//! Every `.toml` file under the content directory may hold any mix of
//! `[[enemy]]`, `[[item]]` and `[[loadout]]` tables. Files are read in sorted
//! path order so the catalog order is stable across platforms.

mod config;
mod registry;

pub use config::{ContentFileConfig, EnemyConfig, ItemConfig, LoadoutConfig, LoadoutEntry};
pub use registry::ContentRegistry;

use std::path::PathBuf;
use thiserror::Error;

/// Error loading content
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{}': {}", .path.display(), .error)]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{}': {}", .path.display(), .message)]
    Validation { message: String, path: PathBuf },
}
