//! SQLite-backed key-value storage.
//!
//! Provides persistent storage for:
//! - The event snapshot (one JSON array under a single key)
//! - The subject list used by class events
//! - Arbitrary application state in the same `kv` table

use std::path::Path;

use rusqlite::{params, Connection};

use super::config::StorageConfig;
use super::data_dir;
use super::traits::{decode_snapshot, EventStore, SubjectRegistry};
use crate::error::{DatabaseError, Result};
use crate::event::Event;

/// SQLite database holding the agenda snapshot.
pub struct Database {
    conn: Connection,
    storage: StorageConfig,
}

impl Database {
    /// Open the database at `~/.config/agenda/agenda.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open(storage: StorageConfig) -> Result<Self> {
        Self::open_path(data_dir()?.join("agenda.db"), storage)
    }

    /// Open (or create) a database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_path(path: impl AsRef<Path>, storage: StorageConfig) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn, storage };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn,
            storage: StorageConfig::default(),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> std::result::Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Replace the stored subject list.
    ///
    /// # Errors
    /// Returns an error if the list cannot be written.
    pub fn set_subjects(&self, subjects: &[String]) -> Result<()> {
        let raw = serde_json::to_string(subjects)?;
        self.kv_set(&self.storage.subjects_key, &raw)?;
        Ok(())
    }
}

impl EventStore for Database {
    fn load_all_events(&self) -> Vec<Event> {
        match self.kv_get(&self.storage.events_key) {
            Ok(raw) => decode_snapshot(raw.as_deref(), &self.storage.events_key),
            Err(e) => {
                tracing::warn!(
                    "Failed to read event snapshot '{}': {}",
                    self.storage.events_key,
                    e
                );
                Vec::new()
            }
        }
    }

    fn replace_all_events(&self, events: &[Event]) -> Result<()> {
        let raw = serde_json::to_string(events)?;
        self.kv_set(&self.storage.events_key, &raw)?;
        tracing::debug!("Persisted snapshot of {} events", events.len());
        Ok(())
    }
}

impl SubjectRegistry for Database {
    fn list_subjects(&self) -> Vec<String> {
        let stored = self
            .kv_get(&self.storage.subjects_key)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok());
        stored.unwrap_or_else(|| self.storage.default_subjects.clone())
    }
}
