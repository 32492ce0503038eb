//! Recurrence rules attached to `repeat = custom` events.
//!
//! A rule is a plain value: every N days/weeks/months/years, optionally on a
//! set of weekdays, ending never, after a total count, or on a date.
//! Validation needs the base event's date (for `OnDate`), so it happens in
//! [`RecurrenceRule::build`] / [`RecurrenceRule::validate`] rather than in
//! deserialization.
//!
//! Weekday indices follow the stored format: 0 = Sunday ... 6 = Saturday.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Unit the interval counts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    Week,
    Month,
    Year,
}

impl Frequency {
    /// Date `n` units after `base`.
    ///
    /// Month and year steps are measured from `base` (not chained), and an
    /// overflowing day-of-month is clamped to the last day of the target
    /// month, so Jan 31 + 1 month is Feb 28/29 and + 2 months is Mar 31.
    /// Returns `None` past the end of chrono's representable range.
    pub fn advance(self, base: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Day => base.checked_add_days(Days::new(u64::from(n))),
            Frequency::Week => base.checked_add_days(Days::new(u64::from(n) * 7)),
            Frequency::Month => base.checked_add_months(Months::new(n)),
            Frequency::Year => base.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

/// When a custom series stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EndCondition {
    /// Unbounded; expansion still stops at the safety cap.
    Never,
    /// Total occurrences, base included.
    AfterCount { count: u32 },
    /// Last permitted date, inclusive.
    OnDate { date: NaiveDate },
}

/// Repetition specification for `repeat = custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RuleWire")]
pub struct RecurrenceRule {
    pub interval: u32,
    pub frequency: Frequency,
    /// Only meaningful for [`Frequency::Week`].
    pub weekdays: BTreeSet<u8>,
    pub end_condition: EndCondition,
}

impl RecurrenceRule {
    /// Builds and validates a rule for a series starting on `base_date`.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] when the interval is zero, a weekly rule
    /// has no weekdays, a weekday index is out of range, an `AfterCount` is
    /// zero, or an `OnDate` precedes `base_date`.
    pub fn build(
        interval: u32,
        frequency: Frequency,
        weekdays: impl IntoIterator<Item = u8>,
        end_condition: EndCondition,
        base_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let rule = Self {
            interval,
            frequency,
            weekdays: weekdays.into_iter().collect(),
            end_condition,
        };
        rule.validate(base_date)?;
        Ok(rule)
    }

    /// Re-checks an existing rule against a base date.
    pub fn validate(&self, base_date: NaiveDate) -> Result<(), ValidationError> {
        if self.interval == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        if let Some(&bad) = self.weekdays.iter().find(|&&day| day > 6) {
            return Err(ValidationError::InvalidWeekday(bad));
        }
        if self.frequency == Frequency::Week && self.weekdays.is_empty() {
            return Err(ValidationError::EmptyWeekdays);
        }
        match self.end_condition {
            EndCondition::Never => {}
            EndCondition::AfterCount { count } => {
                if count == 0 {
                    return Err(ValidationError::ZeroCount);
                }
            }
            EndCondition::OnDate { date } => {
                if date < base_date {
                    return Err(ValidationError::EndBeforeStart {
                        base: base_date,
                        end: date,
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `date` falls on one of the selected weekdays.
    pub fn selects_weekday(&self, date: NaiveDate) -> bool {
        self.weekdays.contains(&weekday_index(date))
    }
}

/// 0 = Sunday ... 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Accepts both the current shape and the flat `endType`/`endAfter`/`endOn`
/// shape older snapshots were written with.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleWire {
    interval: u32,
    frequency: Frequency,
    #[serde(default)]
    weekdays: Vec<u8>,
    #[serde(default)]
    end_condition: Option<EndCondition>,
    #[serde(default)]
    end_type: Option<String>,
    #[serde(default)]
    end_after: Option<u32>,
    #[serde(default)]
    end_on: Option<String>,
}

impl TryFrom<RuleWire> for RecurrenceRule {
    type Error = String;

    fn try_from(wire: RuleWire) -> Result<Self, Self::Error> {
        let end_condition = match (wire.end_condition, wire.end_type.as_deref()) {
            (Some(condition), _) => condition,
            (None, Some("after")) => EndCondition::AfterCount {
                count: wire
                    .end_after
                    .ok_or_else(|| "endType 'after' without endAfter".to_string())?,
            },
            (None, Some("on")) => {
                let raw = wire
                    .end_on
                    .ok_or_else(|| "endType 'on' without endOn".to_string())?;
                let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|err| format!("invalid endOn '{raw}': {err}"))?;
                EndCondition::OnDate { date }
            }
            (None, Some("never")) | (None, None) => EndCondition::Never,
            (None, Some(other)) => return Err(format!("unknown endType '{other}'")),
        };

        Ok(Self {
            interval: wire.interval,
            frequency: wire.frequency,
            weekdays: wire.weekdays.into_iter().collect(),
            end_condition,
        })
    }
}
