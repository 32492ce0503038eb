//! # Agenda Core Library
//!
//! This library provides the scheduling engine behind the Agenda planner:
//! classes and events that repeat, edits and deletes that can target one
//! occurrence or a whole series, and the "what is still relevant now" view.
//!
//! ## Architecture
//!
//! - **Recurrence**: Rule model and validation (interval, frequency,
//!   weekdays, end condition)
//! - **Expansion**: Materializes a repeating base event into concrete
//!   occurrences, bounded by a safety cap
//! - **Series**: Groups occurrences by series id, with a fallback for
//!   snapshots written before series ids existed
//! - **Mutation**: Scoped edit/delete producing the next collection
//! - **Window**: Date-range queries filtered by liveness relative to now
//! - **Storage**: SQLite-backed snapshot storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Planner`]: Session facade, load once and write the snapshot per mutation
//! - [`Event`]: One calendar occurrence
//! - [`RecurrenceRule`]: Custom repeat rule
//! - [`Database`]: Snapshot persistence
//! - [`Config`]: Application configuration management

pub mod collection;
pub mod error;
pub mod event;
pub mod expand;
pub mod mutate;
pub mod planner;
pub mod recurrence;
pub mod series;
pub mod storage;
pub mod window;

pub use collection::EventCollection;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use event::{Category, Event, EventDraft, EventId, RepeatKind, SeriesId};
pub use expand::{expand, expand_with, Expansion, ExpansionLimits};
pub use mutate::{delete_event, edit_event, MutationOutcome, Scope};
pub use planner::{CreatedSeries, Planner};
pub use recurrence::{EndCondition, Frequency, RecurrenceRule};
pub use series::{assign_series_ids, resolve_series, SeriesKey};
pub use storage::{Config, Database, EventStore, MemoryStore, SubjectRegistry};
pub use window::{occurrences_in_window, CategoryFilter, WindowQuery};
