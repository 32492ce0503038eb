//! In-process store for tests and embedders without a database.
//!
//! Holds the snapshot as serialized JSON so it behaves like the durable
//! slot: loads decode, malformed content reads as empty, and every replace
//! is counted.

use std::cell::{Cell, RefCell};

use super::traits::{decode_snapshot, EventStore, SubjectRegistry};
use crate::error::Result;
use crate::event::Event;

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RefCell<Option<String>>,
    subjects: Vec<String>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a raw snapshot string, which need not be valid.
    pub fn with_snapshot(raw: impl Into<String>) -> Self {
        Self {
            snapshot: RefCell::new(Some(raw.into())),
            ..Self::default()
        }
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn raw_snapshot(&self) -> Option<String> {
        self.snapshot.borrow().clone()
    }

    /// Number of successful `replace_all_events` calls.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl EventStore for MemoryStore {
    fn load_all_events(&self) -> Vec<Event> {
        decode_snapshot(self.snapshot.borrow().as_deref(), "memory store")
    }

    fn replace_all_events(&self, events: &[Event]) -> Result<()> {
        let raw = serde_json::to_string(events)?;
        *self.snapshot.borrow_mut() = Some(raw);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl SubjectRegistry for MemoryStore {
    fn list_subjects(&self) -> Vec<String> {
        self.subjects.clone()
    }
}
