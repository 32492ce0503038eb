//! The owned event aggregate.
//!
//! Events are keyed by id and keep insertion order, which is also the order
//! they are persisted in. Mutating operations build a new collection and the
//! caller swaps it in after the snapshot write succeeds.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::event::{Event, EventId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCollection {
    events: IndexMap<EventId, Event>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from a snapshot. A repeated id keeps its first
    /// position and the last value.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut collection = Self::new();
        for event in events {
            collection.insert(event);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.events.contains_key(id)
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn get_mut(&mut self, id: &EventId) -> Option<&mut Event> {
        self.events.get_mut(id)
    }

    /// Inserts or replaces by id, returning the replaced event.
    pub fn insert(&mut self, event: Event) -> Option<Event> {
        self.events.insert(event.id.clone(), event)
    }

    /// Removes by id, keeping the order of the remaining events.
    pub fn remove(&mut self, id: &EventId) -> Option<Event> {
        self.events.shift_remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Event> {
        self.events.values_mut()
    }

    pub fn to_vec(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }
}

impl Extend<Event> for EventCollection {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        for event in iter {
            self.insert(event);
        }
    }
}

impl FromIterator<Event> for EventCollection {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        Self::from_events(iter)
    }
}

impl<'a> IntoIterator for &'a EventCollection {
    type Item = &'a Event;
    type IntoIter = indexmap::map::Values<'a, EventId, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.values()
    }
}

// Persisted as a plain array of events.
impl Serialize for EventCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.events.values())
    }
}

impl<'de> Deserialize<'de> for EventCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Event>::deserialize(deserializer).map(Self::from_events)
    }
}
