//! Series membership.
//!
//! Occurrences written by this crate carry an explicit [`SeriesId`]. Older
//! snapshots have none; for those, membership falls back to matching
//! `(title, category, subject, repeat, seriesCreatedAt)`. The fallback is
//! ambiguous when two series were created with identical fields in the same
//! instant, which is why [`assign_series_ids`] upgrades legacy groups once
//! at load.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::collection::EventCollection;
use crate::event::{Category, Event, EventId, RepeatKind, SeriesId};

/// What ties an occurrence to its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    /// Non-repeating event, a series of one.
    Single(EventId),
    Explicit(SeriesId),
    Legacy {
        title: String,
        category: Category,
        subject: Option<String>,
        repeat: RepeatKind,
        created_at: NaiveDateTime,
    },
}

impl SeriesKey {
    pub fn of(event: &Event) -> Self {
        if !event.is_recurring() {
            return SeriesKey::Single(event.id.clone());
        }
        match event.series_id {
            Some(id) => SeriesKey::Explicit(id),
            None => SeriesKey::Legacy {
                title: event.title.clone(),
                category: event.category,
                subject: event.subject.clone(),
                repeat: event.repeat,
                created_at: event.series_created_at,
            },
        }
    }

    /// Membership test without building a key per candidate.
    pub fn matches(&self, candidate: &Event) -> bool {
        match self {
            SeriesKey::Single(id) => candidate.id == *id,
            SeriesKey::Explicit(series) => {
                candidate.is_recurring() && candidate.series_id == Some(*series)
            }
            SeriesKey::Legacy {
                title,
                category,
                subject,
                repeat,
                created_at,
            } => {
                candidate.series_id.is_none()
                    && candidate.repeat == *repeat
                    && candidate.series_created_at == *created_at
                    && candidate.category == *category
                    && candidate.subject == *subject
                    && candidate.title == *title
            }
        }
    }
}

/// Every event in `all` belonging to `event`'s series, in collection order.
///
/// A non-repeating event resolves to itself only.
pub fn resolve_series<'a>(event: &'a Event, all: &'a EventCollection) -> Vec<&'a Event> {
    let key = SeriesKey::of(event);
    if let SeriesKey::Single(_) = key {
        return vec![event];
    }
    all.iter().filter(|candidate| key.matches(candidate)).collect()
}

/// Ids of `event`'s series in collection order.
pub fn series_ids(event: &Event, all: &EventCollection) -> Vec<EventId> {
    resolve_series(event, all)
        .into_iter()
        .map(|e| e.id.clone())
        .collect()
}

/// Gives every legacy repeating group its own [`SeriesId`].
///
/// Returns how many events were updated; zero means the collection already
/// uses explicit ids throughout.
pub fn assign_series_ids(events: &mut EventCollection) -> usize {
    let mut assigned: HashMap<SeriesKey, SeriesId> = HashMap::new();
    let mut updated = 0;

    for event in events.iter_mut() {
        if !event.is_recurring() || event.series_id.is_some() {
            continue;
        }
        let key = SeriesKey::of(event);
        let id = *assigned.entry(key).or_insert_with(SeriesId::generate);
        event.series_id = Some(id);
        updated += 1;
    }

    if updated > 0 {
        tracing::info!(
            "Assigned series ids to {} legacy occurrences in {} series",
            updated,
            assigned.len()
        );
    }
    updated
}
