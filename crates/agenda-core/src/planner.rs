//! Session facade over a store.
//!
//! A `Planner` loads the full snapshot once, keeps it as an
//! [`EventCollection`], and writes the complete collection back after every
//! mutation. The in-memory state only changes after the write succeeded, so
//! a failed persist leaves the session exactly as it was.

use chrono::{Duration, NaiveDateTime};

use crate::collection::EventCollection;
use crate::error::{CoreError, Result};
use crate::event::{Category, Event, EventDraft, EventId};
use crate::expand::{expand_with, ExpansionLimits};
use crate::mutate::{self, MutationOutcome, Scope};
use crate::series::{assign_series_ids, resolve_series};
use crate::storage::{Config, EventStore, SubjectRegistry};
use crate::window::WindowQuery;

/// Result of creating a base event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSeries {
    pub base_id: EventId,
    /// Base id first, then generated occurrences in date order.
    pub ids: Vec<EventId>,
    /// The safety cap cut the series short.
    pub limit_reached: bool,
}

pub struct Planner<S, R> {
    store: S,
    subjects: R,
    events: EventCollection,
    limits: ExpansionLimits,
    grace: Duration,
}

impl<S: EventStore, R: SubjectRegistry> Planner<S, R> {
    /// Loads the snapshot and upgrades legacy series to explicit ids.
    ///
    /// # Errors
    /// Returns an error only if the migrated snapshot cannot be written back.
    pub fn open(store: S, subjects: R, limits: ExpansionLimits, grace: Duration) -> Result<Self> {
        let mut planner = Self {
            store,
            subjects,
            events: EventCollection::new(),
            limits,
            grace,
        };
        planner.reload()?;
        Ok(planner)
    }

    /// # Errors
    /// See [`Planner::open`].
    pub fn from_config(store: S, subjects: R, config: &Config) -> Result<Self> {
        Self::open(store, subjects, config.expansion_limits(), config.grace())
    }

    /// Re-reads the snapshot, discarding in-memory state.
    ///
    /// # Errors
    /// Returns an error if a legacy migration cannot be persisted.
    pub fn reload(&mut self) -> Result<()> {
        let mut events = EventCollection::from_events(self.store.load_all_events());
        if assign_series_ids(&mut events) > 0 {
            self.store.replace_all_events(&events.to_vec())?;
        }
        tracing::debug!("Loaded {} events", events.len());
        self.events = events;
        Ok(())
    }

    pub fn events(&self) -> &EventCollection {
        &self.events
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }

    pub fn limits(&self) -> ExpansionLimits {
        self.limits
    }

    /// Creates a base event and, when it repeats, all of its occurrences.
    ///
    /// # Errors
    /// [`CoreError::Validation`] for a malformed draft, or a storage error if
    /// the snapshot cannot be written. Nothing is stored on failure.
    pub fn create_event(
        &mut self,
        draft: &EventDraft,
        created_at: NaiveDateTime,
    ) -> Result<CreatedSeries> {
        let base = Event::from_draft(draft, created_at)?;
        self.check_subject(&base);

        let expansion = expand_with(&base, &self.limits)?;
        let base_id = base.id.clone();
        let mut ids = Vec::with_capacity(expansion.occurrences.len() + 1);
        ids.push(base_id.clone());
        ids.extend(expansion.occurrences.iter().map(|e| e.id.clone()));

        let mut next = self.events.clone();
        next.insert(base);
        next.extend(expansion.occurrences);
        self.commit(next)?;

        tracing::info!(
            "Created '{}' with {} occurrence(s){}",
            draft.title,
            ids.len(),
            if expansion.limit_reached {
                " (safety cap reached)"
            } else {
                ""
            }
        );

        Ok(CreatedSeries {
            base_id,
            ids,
            limit_reached: expansion.limit_reached,
        })
    }

    /// # Errors
    /// See [`mutate::edit_event`]; also fails if the snapshot cannot be
    /// written, in which case the session is unchanged.
    pub fn edit_event(
        &mut self,
        id: &EventId,
        scope: Scope,
        draft: &EventDraft,
    ) -> Result<MutationOutcome> {
        let (next, outcome) = mutate::edit_event(&self.events, id, scope, draft)?;
        if let Some(edited) = next.get(id) {
            self.check_subject(edited);
        }
        self.commit(next)?;
        Ok(outcome)
    }

    /// # Errors
    /// See [`mutate::delete_event`]; also fails if the snapshot cannot be
    /// written, in which case the session is unchanged.
    pub fn delete_event(&mut self, id: &EventId, scope: Scope) -> Result<MutationOutcome> {
        let (next, outcome) = mutate::delete_event(&self.events, id, scope)?;
        self.commit(next)?;
        Ok(outcome)
    }

    /// Every occurrence in `id`'s series.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if `id` is unknown.
    pub fn series(&self, id: &EventId) -> Result<Vec<&Event>> {
        let event = self
            .events
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        Ok(resolve_series(event, &self.events))
    }

    /// Runs `query` with this planner's grace period.
    pub fn window(&self, query: &WindowQuery, now: NaiveDateTime) -> Vec<&Event> {
        query.with_grace(self.grace).run(&self.events, now)
    }

    fn commit(&mut self, next: EventCollection) -> Result<()> {
        self.store.replace_all_events(&next.to_vec())?;
        self.events = next;
        Ok(())
    }

    // Unknown subjects are accepted; the registry is advisory.
    fn check_subject(&self, event: &Event) {
        if event.category != Category::Class {
            return;
        }
        let Some(subject) = event.subject.as_deref() else {
            return;
        };
        if !self.subjects.list_subjects().iter().any(|s| s == subject) {
            tracing::warn!("Subject '{}' is not in the subject list", subject);
        }
    }
}
