mod config;
pub mod database;
pub mod memory;
pub mod traits;

pub use config::{AgendaConfig, Config, ExpansionConfig, StorageConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use traits::{EventStore, SubjectRegistry};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/agenda[-dev]/` based on AGENDA_ENV.
///
/// Set AGENDA_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("AGENDA_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("agenda-dev")
    } else {
        base_dir.join("agenda")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
