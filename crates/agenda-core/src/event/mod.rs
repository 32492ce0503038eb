//! Calendar event model.
//!
//! An [`Event`] is one concrete dated occurrence. Occurrences of the same
//! repeating series share a [`SeriesId`] (and, on snapshots written before
//! series ids existed, the `seriesCreatedAt` stamp). All dates and times are
//! naive local wall-clock values.

pub mod time_format;

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::recurrence::RecurrenceRule;

/// Opaque, immutable occurrence identifier.
///
/// New ids are UUID v4 strings; ids loaded from older snapshots keep
/// whatever text they were stored with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit series key, generated once per repeating base event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(Uuid);

impl SeriesId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event category. `Class` events are tied to a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Class,
    Event,
}

/// Recurrence kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

/// One calendar occurrence.
///
/// Serialized with camelCase field names. `type` and `created` are accepted
/// as aliases for `category` and `seriesCreatedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(alias = "type")]
    pub category: Category,
    #[serde(default)]
    pub subject: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default, with = "time_format::optional_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "time_format::optional_time")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub repeat: RepeatKind,
    #[serde(default)]
    pub custom_recurrence: Option<RecurrenceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<SeriesId>,
    #[serde(alias = "created", with = "time_format::timestamp")]
    pub series_created_at: NaiveDateTime,
}

impl Event {
    /// Builds a base event from a draft with a fresh id.
    ///
    /// Repeating drafts get a new [`SeriesId`]; one-off events get none.
    /// The draft is validated first.
    pub fn from_draft(
        draft: &EventDraft,
        created_at: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        draft.validate()?;
        let series_id = (draft.repeat != RepeatKind::None).then(SeriesId::generate);
        Ok(Self {
            id: EventId::generate(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            category: draft.category,
            subject: draft.subject.clone(),
            date: draft.date,
            all_day: draft.all_day,
            start_time: draft.start_time,
            end_time: draft.end_time,
            color: draft.color.clone(),
            repeat: draft.repeat,
            custom_recurrence: draft.custom_recurrence.clone(),
            series_id,
            series_created_at: created_at,
        })
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat != RepeatKind::None
    }

    /// Checks the same invariants as [`EventDraft::validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(Fields {
            title: &self.title,
            category: self.category,
            subject: self.subject.as_deref(),
            date: self.date,
            all_day: self.all_day,
            start_time: self.start_time,
            end_time: self.end_time,
            repeat: self.repeat,
            rule: self.custom_recurrence.as_ref(),
        })
    }

    /// Overwrites the user-editable fields from `draft`.
    ///
    /// `id`, `seriesId` and `seriesCreatedAt` are never touched; `date` only
    /// when `keep_date` is false.
    pub fn apply_draft(&mut self, draft: &EventDraft, keep_date: bool) {
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.location = draft.location.clone();
        self.category = draft.category;
        self.subject = draft.subject.clone();
        if !keep_date {
            self.date = draft.date;
        }
        self.all_day = draft.all_day;
        self.start_time = draft.start_time;
        self.end_time = draft.end_time;
        self.color = draft.color.clone();
        self.repeat = draft.repeat;
        self.custom_recurrence = draft.custom_recurrence.clone();
    }

    /// Detaches this occurrence from its series.
    pub fn detach(&mut self) {
        self.repeat = RepeatKind::None;
        self.custom_recurrence = None;
        self.series_id = None;
    }

    /// Copy of the editable fields, e.g. to pre-fill an edit.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            category: self.category,
            subject: self.subject.clone(),
            date: self.date,
            all_day: self.all_day,
            start_time: self.start_time,
            end_time: self.end_time,
            color: self.color.clone(),
            repeat: self.repeat,
            custom_recurrence: self.custom_recurrence.clone(),
        }
    }
}

/// Caller-supplied field set for creating or editing an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Category,
    pub subject: Option<String>,
    pub date: NaiveDate,
    pub all_day: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub color: String,
    pub repeat: RepeatKind,
    pub custom_recurrence: Option<RecurrenceRule>,
}

impl EventDraft {
    /// A one-off, untimed generic event.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            location: String::new(),
            category: Category::Event,
            subject: None,
            date,
            all_day: false,
            start_time: None,
            end_time: None,
            color: String::new(),
            repeat: RepeatKind::None,
            custom_recurrence: None,
        }
    }

    /// A one-off class session for `subject`.
    pub fn class(title: impl Into<String>, subject: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            category: Category::Class,
            subject: Some(subject.into()),
            ..Self::new(title, date)
        }
    }

    pub fn with_times(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.all_day = false;
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn all_day(mut self) -> Self {
        self.all_day = true;
        self.start_time = None;
        self.end_time = None;
        self
    }

    pub fn repeating(mut self, repeat: RepeatKind) -> Self {
        self.repeat = repeat;
        if repeat != RepeatKind::Custom {
            self.custom_recurrence = None;
        }
        self
    }

    pub fn custom(mut self, rule: RecurrenceRule) -> Self {
        self.repeat = RepeatKind::Custom;
        self.custom_recurrence = Some(rule);
        self
    }

    /// Validates category/subject pairing, time ordering and the rule.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(Fields {
            title: &self.title,
            category: self.category,
            subject: self.subject.as_deref(),
            date: self.date,
            all_day: self.all_day,
            start_time: self.start_time,
            end_time: self.end_time,
            repeat: self.repeat,
            rule: self.custom_recurrence.as_ref(),
        })
    }
}

struct Fields<'a> {
    title: &'a str,
    category: Category,
    subject: Option<&'a str>,
    date: NaiveDate,
    all_day: bool,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    repeat: RepeatKind,
    rule: Option<&'a RecurrenceRule>,
}

fn validate_fields(fields: Fields<'_>) -> Result<(), ValidationError> {
    if fields.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let subject = fields.subject.map(str::trim).filter(|s| !s.is_empty());
    match (fields.category, subject) {
        (Category::Class, None) => return Err(ValidationError::MissingSubject),
        (Category::Event, Some(s)) => return Err(ValidationError::UnexpectedSubject(s.to_string())),
        _ => {}
    }

    if fields.all_day && (fields.start_time.is_some() || fields.end_time.is_some()) {
        return Err(ValidationError::AllDayWithTimes);
    }
    if let (Some(start), Some(end)) = (fields.start_time, fields.end_time) {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
    }

    match (fields.repeat, fields.rule) {
        (RepeatKind::Custom, None) => Err(ValidationError::MissingRecurrenceRule),
        (RepeatKind::Custom, Some(rule)) => rule.validate(fields.date),
        (_, Some(_)) => Err(ValidationError::UnexpectedRecurrenceRule),
        (_, None) => Ok(()),
    }
}
