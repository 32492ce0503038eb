//! Property tests for occurrence expansion.
//!
//! Expansion must terminate for every rule shape, keep dates strictly
//! ascending after the base, and respect each end condition.

use std::collections::BTreeSet;

use agenda_core::{
    expand_with, EndCondition, Event, EventDraft, ExpansionLimits, Frequency, RecurrenceRule,
    RepeatKind,
};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn base_date(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.checked_add_days(Days::new(u64::from(offset))))
        .unwrap_or_else(|| panic!("invalid base offset {offset}"))
}

fn custom_event(start: NaiveDate, rule: RecurrenceRule) -> Event {
    let created = start
        .and_hms_opt(8, 0, 0)
        .unwrap_or_else(|| panic!("invalid creation time"));
    Event::from_draft(&EventDraft::new("Prop", start).custom(rule), created)
        .unwrap_or_else(|e| panic!("invalid draft: {e}"))
}

fn frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Day),
        Just(Frequency::Week),
        Just(Frequency::Month),
        Just(Frequency::Year),
    ]
}

fn weekdays() -> impl Strategy<Value = BTreeSet<u8>> {
    prop::collection::btree_set(0u8..7, 1..=7)
}

fn assert_ascending_after(start: NaiveDate, event: &Event, limits: &ExpansionLimits) -> Vec<NaiveDate> {
    let expansion = expand_with(event, limits).unwrap_or_else(|e| panic!("expand failed: {e}"));
    let dates: Vec<_> = expansion.occurrences.iter().map(|e| e.date).collect();
    assert!(dates.first().map_or(true, |first| *first > start));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    dates
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn never_terminates_at_cap(
        offset in 0u32..3650,
        interval in 1u32..=12,
        freq in frequency(),
        days in weekdays(),
    ) {
        let start = base_date(offset);
        let rule = RecurrenceRule::build(interval, freq, days, EndCondition::Never, start)
            .unwrap_or_else(|e| panic!("invalid rule: {e}"));
        let event = custom_event(start, rule);
        let limits = ExpansionLimits::default();

        let expansion = expand_with(&event, &limits).unwrap_or_else(|e| panic!("expand failed: {e}"));
        prop_assert_eq!(expansion.occurrences.len(), limits.safety_cap - 1);
        prop_assert!(expansion.limit_reached);
        assert_ascending_after(start, &event, &limits);
    }

    #[test]
    fn after_count_yields_exact_total(
        offset in 0u32..3650,
        interval in 1u32..=6,
        freq in frequency(),
        days in weekdays(),
        count in 1u32..=60,
    ) {
        let start = base_date(offset);
        let rule = RecurrenceRule::build(
            interval,
            freq,
            days,
            EndCondition::AfterCount { count },
            start,
        )
        .unwrap_or_else(|e| panic!("invalid rule: {e}"));
        let event = custom_event(start, rule);
        let limits = ExpansionLimits::default();

        let dates = assert_ascending_after(start, &event, &limits);
        prop_assert_eq!(dates.len() + 1, count as usize);
        let expansion = expand_with(&event, &limits).unwrap_or_else(|e| panic!("expand failed: {e}"));
        prop_assert!(!expansion.limit_reached);
    }

    #[test]
    fn on_date_never_passes_end(
        offset in 0u32..3650,
        interval in 1u32..=6,
        freq in frequency(),
        days in weekdays(),
        span in 0u64..800,
    ) {
        let start = base_date(offset);
        let end = start
            .checked_add_days(Days::new(span))
            .unwrap_or_else(|| panic!("invalid end span {span}"));
        let rule = RecurrenceRule::build(interval, freq, days, EndCondition::OnDate { date: end }, start)
            .unwrap_or_else(|e| panic!("invalid rule: {e}"));
        let event = custom_event(start, rule);

        let dates = assert_ascending_after(start, &event, &ExpansionLimits::default());
        prop_assert!(dates.iter().all(|d| *d <= end));
    }

    #[test]
    fn plain_weekly_is_whole_weeks_within_a_year(offset in 0u32..3650) {
        let start = base_date(offset);
        let created = start
            .and_hms_opt(8, 0, 0)
            .unwrap_or_else(|| panic!("invalid creation time"));
        let event = Event::from_draft(&EventDraft::new("Weekly", start).repeating(RepeatKind::Weekly), created)
            .unwrap_or_else(|e| panic!("invalid draft: {e}"));

        let dates = assert_ascending_after(start, &event, &ExpansionLimits::default());
        prop_assert!(dates.len() == 52 || dates.len() == 53);
        for date in dates {
            let gap = (date - start).num_days();
            prop_assert_eq!(gap % 7, 0);
            prop_assert!(gap <= 366);
        }
    }
}
