//! Live agenda queries.
//!
//! A window query is a date-range filter combined with a "still relevant"
//! rule relative to `now`:
//!
//! - dates before today are hidden, dates after today are shown;
//! - on today, all-day (or untimed) events stay visible, timed events stay
//!   visible until their end time, and events with only a start time stay
//!   visible for a grace period after starting.
//!
//! Results are ordered by date, then all-day first, then start time.

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::collection::EventCollection;
use crate::event::{Category, Event};
use crate::recurrence::weekday_index;

/// Visibility after start for events without an end time.
pub const DEFAULT_GRACE_MINUTES: i64 = 120;

/// Optional category restriction applied on top of the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Class,
    Event,
}

impl CategoryFilter {
    pub fn accepts(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Class => category == Category::Class,
            CategoryFilter::Event => category == Category::Event,
        }
    }
}

/// A window over `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub category: CategoryFilter,
    pub grace: Duration,
}

impl WindowQuery {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            category: CategoryFilter::All,
            grace: Duration::minutes(DEFAULT_GRACE_MINUTES),
        }
    }

    /// The Sunday-to-Saturday week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let (start, end) = week_window(date);
        Self::new(start, end)
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn run<'a>(&self, events: &'a EventCollection, now: NaiveDateTime) -> Vec<&'a Event> {
        let mut visible: Vec<&Event> = events
            .iter()
            .filter(|e| e.date >= self.start && e.date <= self.end)
            .filter(|e| self.category.accepts(e.category))
            .filter(|e| is_live(e, now, self.grace))
            .collect();
        visible.sort_by(|a, b| agenda_order(a).cmp(&agenda_order(b)));
        visible
    }
}

/// Events in `start..=end` still relevant at `now`, in agenda order.
pub fn occurrences_in_window(
    events: &EventCollection,
    start: NaiveDate,
    end: NaiveDate,
    now: NaiveDateTime,
) -> Vec<&Event> {
    WindowQuery::new(start, end).run(events, now)
}

/// Whether `event` should still be shown at `now`.
pub fn is_live(event: &Event, now: NaiveDateTime, grace: Duration) -> bool {
    let today = now.date();
    if event.date < today {
        return false;
    }
    if event.date > today {
        return true;
    }
    if event.all_day {
        return true;
    }
    if let Some(end) = event.end_time {
        return now <= event.date.and_time(end);
    }
    if let Some(start) = event.start_time {
        return event
            .date
            .and_time(start)
            .checked_add_signed(grace)
            .map_or(true, |until| now <= until);
    }
    true
}

// All-day sorts before timed; an absent start time sorts first among timed.
fn agenda_order(event: &Event) -> (NaiveDate, bool, Option<chrono::NaiveTime>) {
    (event.date, !event.all_day, event.start_time)
}

/// Sunday on or before `date`, and the Saturday after it.
pub fn week_window(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = u64::from(weekday_index(date));
    let start = date.checked_sub_days(Days::new(back)).unwrap_or(date);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    (start, end)
}

/// Moves a week start by `weeks` (negative for earlier weeks).
pub fn shift_week(start: NaiveDate, weeks: i64) -> NaiveDate {
    let days = Days::new(weeks.unsigned_abs() * 7);
    let shifted = if weeks >= 0 {
        start.checked_add_days(days)
    } else {
        start.checked_sub_days(days)
    };
    shifted.unwrap_or(start)
}

/// One agenda heading and its events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaDay<'a> {
    pub date: NaiveDate,
    pub events: Vec<&'a Event>,
}

/// Groups an already ordered result into per-date buckets.
pub fn group_by_date<'a>(ordered: &[&'a Event]) -> Vec<AgendaDay<'a>> {
    let mut days: Vec<AgendaDay<'a>> = Vec::new();
    for &event in ordered {
        match days.last_mut() {
            Some(day) if day.date == event.date => day.events.push(event),
            _ => days.push(AgendaDay {
                date: event.date,
                events: vec![event],
            }),
        }
    }
    days
}
