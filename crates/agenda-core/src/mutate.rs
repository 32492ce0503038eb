//! Scoped edits and deletes over a series.
//!
//! Each operation reads the current collection and returns the complete
//! next collection; nothing is modified in place, so a failed validation or
//! a missing id leaves the caller's state untouched. Occurrences outside the
//! chosen scope are carried over unchanged.
//!
//! ```text
//! ThisOnly          [target]                 edit detaches it from the series
//! ThisAndFollowing  series with date >= target.date
//! All               whole series
//! ```
//!
//! For a non-repeating target the scope is ignored.

use serde::{Deserialize, Serialize};

use crate::collection::EventCollection;
use crate::error::{CoreError, Result};
use crate::event::{Event, EventDraft, EventId, SeriesId};
use crate::series::resolve_series;

/// Breadth of an edit or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    ThisOnly,
    ThisAndFollowing,
    All,
}

/// What a mutation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// `None` when the target was a standalone event.
    pub scope: Option<Scope>,
    /// Ids edited or removed, in collection order.
    pub affected: Vec<EventId>,
}

/// Ids selected by `scope` for `target`, in collection order.
pub fn select_scope(events: &EventCollection, target: &Event, scope: Scope) -> Vec<EventId> {
    if !target.is_recurring() {
        return vec![target.id.clone()];
    }
    match scope {
        Scope::ThisOnly => vec![target.id.clone()],
        Scope::ThisAndFollowing => resolve_series(target, events)
            .into_iter()
            .filter(|e| e.date >= target.date)
            .map(|e| e.id.clone())
            .collect(),
        Scope::All => resolve_series(target, events)
            .into_iter()
            .map(|e| e.id.clone())
            .collect(),
    }
}

/// Applies `draft` to the occurrences selected by `scope`.
///
/// - standalone target or `ThisOnly`: every editable field including `date`;
///   a `ThisOnly` edit also detaches the occurrence (`repeat = none`).
/// - `ThisAndFollowing` / `All`: every editable field except `date`, which
///   each occurrence keeps.
///
/// # Errors
/// [`CoreError::Validation`] if the draft is malformed,
/// [`CoreError::NotFound`] if `target_id` is not in `events`.
pub fn edit_event(
    events: &EventCollection,
    target_id: &EventId,
    scope: Scope,
    draft: &EventDraft,
) -> Result<(EventCollection, MutationOutcome)> {
    draft.validate()?;
    let target = find(events, target_id)?;

    let recurring = target.is_recurring();
    let affected = select_scope(events, target, scope);
    let mut next = events.clone();

    if !recurring {
        if let Some(event) = next.get_mut(target_id) {
            event.apply_draft(draft, false);
            sync_series_id(event, None);
        }
    } else if scope == Scope::ThisOnly {
        if let Some(event) = next.get_mut(target_id) {
            event.apply_draft(draft, false);
            event.detach();
        }
    } else {
        // Legacy occurrences carry no id; the whole selection shares one.
        let series = target.series_id.unwrap_or_else(SeriesId::generate);
        for id in &affected {
            if let Some(event) = next.get_mut(id) {
                event.apply_draft(draft, true);
                sync_series_id(event, Some(series));
            }
        }
    }

    tracing::info!(
        "Edited {} occurrence(s) of '{}' (scope: {:?})",
        affected.len(),
        target.title,
        scope
    );

    Ok((
        next,
        MutationOutcome {
            scope: recurring.then_some(scope),
            affected,
        },
    ))
}

/// Removes the occurrences selected by `scope`.
///
/// # Errors
/// [`CoreError::NotFound`] if `target_id` is not in `events`.
pub fn delete_event(
    events: &EventCollection,
    target_id: &EventId,
    scope: Scope,
) -> Result<(EventCollection, MutationOutcome)> {
    let target = find(events, target_id)?;

    let recurring = target.is_recurring();
    let affected = select_scope(events, target, scope);
    let mut next = events.clone();
    for id in &affected {
        next.remove(id);
    }

    tracing::info!(
        "Deleted {} occurrence(s) of '{}' (scope: {:?})",
        affected.len(),
        target.title,
        scope
    );

    Ok((
        next,
        MutationOutcome {
            scope: recurring.then_some(scope),
            affected,
        },
    ))
}

fn find<'a>(events: &'a EventCollection, id: &EventId) -> Result<&'a Event> {
    events.get(id).ok_or_else(|| {
        tracing::warn!("Mutation target {} not found", id);
        CoreError::NotFound(id.clone())
    })
}

/// Keeps `seriesId` consistent with `repeat` after a draft was applied: a
/// non-repeating event has none, a repeating one keeps `existing` or gets a
/// fresh id.
fn sync_series_id(event: &mut Event, existing: Option<SeriesId>) {
    if !event.is_recurring() {
        event.series_id = None;
    } else if event.series_id.is_none() {
        event.series_id = Some(existing.unwrap_or_else(SeriesId::generate));
    }
}
