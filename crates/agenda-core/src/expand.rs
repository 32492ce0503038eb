//! Occurrence expansion.
//!
//! Turns a repeating base event into its sibling occurrences. The base
//! itself is never part of the output; the caller stores it alongside.
//!
//! - `daily` / `weekly` / `monthly` run for one calendar year past the base.
//! - `custom` follows the rule's frequency and interval until its end
//!   condition, bounded by a safety cap on the total series size.
//!
//! Expansion validates the base first and produces nothing on failure.

use chrono::{Days, Months, NaiveDate};

use crate::error::ValidationError;
use crate::event::{Event, EventId, RepeatKind};
use crate::recurrence::{EndCondition, Frequency, RecurrenceRule};

/// Maximum series size (base included) for unbounded rules.
pub const SAFETY_CAP: usize = 500;

/// How far plain daily/weekly/monthly series reach.
pub const PLAIN_HORIZON_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    /// Upper bound on occurrences per series, base included.
    pub safety_cap: usize,
    pub plain_horizon_months: u32,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            safety_cap: SAFETY_CAP,
            plain_horizon_months: PLAIN_HORIZON_MONTHS,
        }
    }
}

/// Generated occurrences plus whether the safety cap cut the series short.
///
/// Hitting the cap is a designed truncation, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub occurrences: Vec<Event>,
    pub limit_reached: bool,
}

/// Expands `base` with the default limits.
///
/// # Errors
/// Returns a [`ValidationError`] if the base event or its rule is malformed.
pub fn expand(base: &Event) -> Result<Vec<Event>, ValidationError> {
    expand_with(base, &ExpansionLimits::default()).map(|expansion| expansion.occurrences)
}

/// Expands `base`, returning occurrences in ascending date order.
///
/// # Errors
/// Returns a [`ValidationError`] if the base event or its rule is malformed.
pub fn expand_with(base: &Event, limits: &ExpansionLimits) -> Result<Expansion, ValidationError> {
    base.validate()?;

    let (dates, limit_reached) = match base.repeat {
        RepeatKind::None => (Vec::new(), false),
        RepeatKind::Daily => plain_dates(base.date, Frequency::Day, limits),
        RepeatKind::Weekly => plain_dates(base.date, Frequency::Week, limits),
        RepeatKind::Monthly => plain_dates(base.date, Frequency::Month, limits),
        RepeatKind::Custom => {
            let rule = base
                .custom_recurrence
                .as_ref()
                .ok_or(ValidationError::MissingRecurrenceRule)?;
            custom_dates(base.date, rule, limits)
        }
    };

    if limit_reached {
        tracing::debug!(
            "Expansion of '{}' stopped at safety cap of {} occurrences",
            base.title,
            limits.safety_cap
        );
    }
    tracing::debug!(
        "Expanded '{}' ({:?}) into {} occurrences",
        base.title,
        base.repeat,
        dates.len()
    );

    let occurrences = dates
        .into_iter()
        .map(|date| Event {
            id: EventId::generate(),
            date,
            ..base.clone()
        })
        .collect();

    Ok(Expansion {
        occurrences,
        limit_reached,
    })
}

/// Steps of one unit from the base up to the horizon (inclusive).
fn plain_dates(
    base: NaiveDate,
    frequency: Frequency,
    limits: &ExpansionLimits,
) -> (Vec<NaiveDate>, bool) {
    let horizon = base
        .checked_add_months(Months::new(limits.plain_horizon_months))
        .unwrap_or(base);
    let budget = limits.safety_cap.saturating_sub(1);

    let mut dates = Vec::new();
    let mut step = 1;
    while let Some(date) = frequency.advance(base, step) {
        if date > horizon {
            return (dates, false);
        }
        if dates.len() >= budget {
            return (dates, true);
        }
        dates.push(date);
        step += 1;
    }
    (dates, false)
}

fn custom_dates(
    base: NaiveDate,
    rule: &RecurrenceRule,
    limits: &ExpansionLimits,
) -> (Vec<NaiveDate>, bool) {
    // `total` counts the base; `bounded_by_count` means stopping at the
    // budget is the rule's own end, not truncation.
    let (budget, bounded_by_count) = match rule.end_condition {
        EndCondition::AfterCount { count } if (count as usize) <= limits.safety_cap => {
            (count as usize, true)
        }
        _ => (limits.safety_cap, false),
    };
    let until = match rule.end_condition {
        EndCondition::OnDate { date } => Some(date),
        _ => None,
    };

    let mut walk = CustomWalk {
        dates: Vec::new(),
        budget: budget.saturating_sub(1),
        until,
    };

    let exhausted = if rule.frequency == Frequency::Week {
        walk.weekday_blocks(base, rule)
    } else {
        walk.interval_steps(base, rule)
    };

    (walk.dates, exhausted && !bounded_by_count)
}

struct CustomWalk {
    dates: Vec<NaiveDate>,
    /// Occurrences still allowed besides the base.
    budget: usize,
    until: Option<NaiveDate>,
}

enum Step {
    Continue,
    PastEnd,
    Exhausted,
}

impl CustomWalk {
    fn offer(&mut self, date: NaiveDate) -> Step {
        if self.until.is_some_and(|until| date > until) {
            return Step::PastEnd;
        }
        if self.dates.len() >= self.budget {
            return Step::Exhausted;
        }
        self.dates.push(date);
        Step::Continue
    }

    /// Every selected weekday inside consecutive blocks of `interval` weeks,
    /// the first block starting the day after the base. Returns whether the
    /// budget ran out.
    fn weekday_blocks(&mut self, base: NaiveDate, rule: &RecurrenceRule) -> bool {
        let block_len = u64::from(rule.interval) * 7;
        let Some(mut block_start) = base.checked_add_days(Days::new(1)) else {
            return false;
        };

        loop {
            for offset in 0..block_len {
                let Some(date) = block_start.checked_add_days(Days::new(offset)) else {
                    return false;
                };
                if !rule.selects_weekday(date) {
                    continue;
                }
                match self.offer(date) {
                    Step::Continue => {}
                    Step::PastEnd => return false,
                    Step::Exhausted => return true,
                }
            }
            match block_start.checked_add_days(Days::new(block_len)) {
                Some(next) => block_start = next,
                None => return false,
            }
        }
    }

    /// `base + k * interval` units for k = 1, 2, ...
    fn interval_steps(&mut self, base: NaiveDate, rule: &RecurrenceRule) -> bool {
        let mut k: u32 = 1;
        loop {
            let Some(date) = k
                .checked_mul(rule.interval)
                .and_then(|n| rule.frequency.advance(base, n))
            else {
                return false;
            };
            match self.offer(date) {
                Step::Continue => {}
                Step::PastEnd => return false,
                Step::Exhausted => return true,
            }
            k += 1;
        }
    }
}
