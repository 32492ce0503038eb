//! Core error types for agenda-core.
//!
//! Caller-input problems surface as [`ValidationError`] or
//! [`CoreError::NotFound`] before any state is touched. Storage failures are
//! wrapped in [`DatabaseError`]; a malformed snapshot is not an error at all
//! (the store reads as empty).

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::event::EventId;

/// Core error type for agenda-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed event or recurrence rule
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Mutation targeted an id absent from the collection
    #[error("Event not found: {0}")]
    NotFound(EventId),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Home/config directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors for events and recurrence rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Event title must not be empty")]
    EmptyTitle,

    #[error("A class event requires a subject")]
    MissingSubject,

    #[error("Only class events may carry a subject (got '{0}')")]
    UnexpectedSubject(String),

    #[error("All-day events cannot carry start or end times")]
    AllDayWithTimes,

    /// Invalid time range
    #[error("Invalid time range: end_time ({end}) must be greater than start_time ({start})")]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("repeat = custom requires a recurrence rule")]
    MissingRecurrenceRule,

    #[error("A recurrence rule is only allowed when repeat = custom")]
    UnexpectedRecurrenceRule,

    #[error("Recurrence interval must be at least 1")]
    ZeroInterval,

    #[error("Weekly recurrence requires at least one weekday")]
    EmptyWeekdays,

    #[error("Weekday index {0} is out of range (expected 0-6)")]
    InvalidWeekday(u8),

    #[error("afterCount end condition requires a count of at least 1")]
    ZeroCount,

    #[error("End date {end} is before the base date {base}")]
    EndBeforeStart { base: NaiveDate, end: NaiveDate },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::EmptyWeekdays.into();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyWeekdays)));
        assert_eq!(
            err.to_string(),
            "Validation error: Weekly recurrence requires at least one weekday"
        );
    }

    #[test]
    fn time_range_message_names_both_bounds() {
        let err = ValidationError::InvalidTimeRange {
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10:00:00"));
        assert!(msg.contains("09:00:00"));
    }
}
