//! TOML-based application configuration.
//!
//! Stores tunables for:
//! - Occurrence expansion (safety cap, plain repeat horizon)
//! - Agenda visibility (grace period)
//! - Storage keys and the fallback subject list
//!
//! Configuration is stored at `~/.config/agenda/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::expand::{ExpansionLimits, PLAIN_HORIZON_MONTHS, SAFETY_CAP};
use crate::window::DEFAULT_GRACE_MINUTES;

/// Expansion bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    #[serde(default = "default_safety_cap")]
    pub safety_cap: usize,
    #[serde(default = "default_plain_horizon_months")]
    pub plain_horizon_months: u32,
}

/// Agenda view configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Minutes a start-only event stays visible after it begins.
    #[serde(default = "default_grace_minutes")]
    pub grace_minutes: i64,
}

/// Storage slot names and the subject list used when none is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_events_key")]
    pub events_key: String,
    #[serde(default = "default_subjects_key")]
    pub subjects_key: String,
    #[serde(default = "default_subjects")]
    pub default_subjects: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/agenda/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub expansion: ExpansionConfig,
    #[serde(default)]
    pub agenda: AgendaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

// Default functions
fn default_safety_cap() -> usize {
    SAFETY_CAP
}
fn default_plain_horizon_months() -> u32 {
    PLAIN_HORIZON_MONTHS
}
fn default_grace_minutes() -> i64 {
    DEFAULT_GRACE_MINUTES
}
fn default_events_key() -> String {
    "scheduleEvents".into()
}
fn default_subjects_key() -> String {
    "subjects".into()
}
fn default_subjects() -> Vec<String> {
    vec!["Math".into(), "Science".into(), "History".into()]
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            safety_cap: default_safety_cap(),
            plain_horizon_months: default_plain_horizon_months(),
        }
    }
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            grace_minutes: default_grace_minutes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            events_key: default_events_key(),
            subjects_key: default_subjects_key(),
            default_subjects: default_subjects(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };

        let mut current = root;
        for part in parent.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<i64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as integer")));
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds invalid
    /// values. An existing file is never overwritten.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.check()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.check()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default config: {}", e);
            Self::default()
        })
    }

    pub fn expansion_limits(&self) -> ExpansionLimits {
        ExpansionLimits {
            safety_cap: self.expansion.safety_cap,
            plain_horizon_months: self.expansion.plain_horizon_months,
        }
    }

    pub fn grace(&self) -> Duration {
        Duration::minutes(self.agenda.grace_minutes)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.expansion.safety_cap == 0 {
            return Err(invalid("expansion.safety_cap", "must be at least 1"));
        }
        if self.agenda.grace_minutes < 0 {
            return Err(invalid("agenda.grace_minutes", "must not be negative"));
        }
        let storage = &self.storage;
        if storage.events_key.is_empty() || storage.events_key == storage.subjects_key {
            return Err(invalid("storage.events_key", "must be non-empty and distinct"));
        }
        Ok(())
    }
}
