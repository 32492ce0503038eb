//! Collaborator contracts for persistence and the subject list.

use crate::error::Result;
use crate::event::Event;

/// Whole-snapshot event persistence.
///
/// There is no partial write: every mutation replaces the full snapshot.
pub trait EventStore {
    /// Every stored event, or an empty list when nothing is stored or the
    /// snapshot cannot be parsed. Never fails.
    fn load_all_events(&self) -> Vec<Event>;

    /// Atomically replaces the stored snapshot.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be serialized or written.
    fn replace_all_events(&self, events: &[Event]) -> Result<()>;
}

/// Known subjects for class events. Consulted for advisory checks only.
pub trait SubjectRegistry {
    fn list_subjects(&self) -> Vec<String>;
}

impl<T: EventStore + ?Sized> EventStore for &T {
    fn load_all_events(&self) -> Vec<Event> {
        (**self).load_all_events()
    }

    fn replace_all_events(&self, events: &[Event]) -> Result<()> {
        (**self).replace_all_events(events)
    }
}

impl<T: SubjectRegistry + ?Sized> SubjectRegistry for &T {
    fn list_subjects(&self) -> Vec<String> {
        (**self).list_subjects()
    }
}

impl SubjectRegistry for Vec<String> {
    fn list_subjects(&self) -> Vec<String> {
        self.clone()
    }
}

/// Decodes a stored snapshot, treating anything malformed as empty.
pub(crate) fn decode_snapshot(raw: Option<&str>, source: &str) -> Vec<Event> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Event>>(raw) {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!("Ignoring malformed event snapshot in {}: {}", source, e);
            Vec::new()
        }
    }
}
