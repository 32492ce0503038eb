//! Integration tests for the planner session workflow.
//!
//! Create, query, edit and delete through one `Planner`, checking that each
//! successful mutation writes exactly one snapshot and failures write none.

use agenda_core::storage::Config;
use agenda_core::{
    CoreError, EndCondition, EventDraft, EventId, Frequency, MemoryStore, Planner,
    RecurrenceRule, RepeatKind, Scope, WindowQuery,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn created() -> NaiveDateTime {
    date(2025, 9, 1).and_hms_opt(7, 45, 0).unwrap()
}

#[test]
fn test_full_session_workflow() {
    let store = MemoryStore::new().with_subjects(["Math", "Science"]);
    let config = Config::default();
    let mut planner = Planner::from_config(&store, &store, &config).unwrap();

    // Tue/Thu lectures for four weeks starting Tuesday 2025-09-02.
    let start = date(2025, 9, 2);
    let rule = RecurrenceRule::build(
        1,
        Frequency::Week,
        [2, 4],
        EndCondition::OnDate {
            date: date(2025, 9, 30),
        },
        start,
    )
    .unwrap();
    let draft = EventDraft::class("Calculus", "Math", start)
        .with_times(NaiveTime::from_hms_opt(10, 0, 0), NaiveTime::from_hms_opt(11, 30, 0))
        .custom(rule);
    let lectures = planner.create_event(&draft, created()).unwrap();
    assert_eq!(lectures.ids.len(), 9);
    assert_eq!(store.write_count(), 1);

    let dentist = planner
        .create_event(&EventDraft::new("Dentist", date(2025, 9, 11)).all_day(), created())
        .unwrap();
    assert_eq!(store.write_count(), 2);

    // Week of Thursday 2025-09-11 at 12:00: Thursday's lecture is over.
    let now = date(2025, 9, 11).and_hms_opt(12, 0, 0).unwrap();
    let week = planner.window(&WindowQuery::week_of(now.date()), now);
    let titles: Vec<_> = week.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Dentist"]);

    // Rename from the fifth lecture on.
    let mut rename = draft.clone();
    rename.title = "Calculus II".to_string();
    let outcome = planner
        .edit_event(&lectures.ids[4], Scope::ThisAndFollowing, &rename)
        .unwrap();
    assert_eq!(outcome.affected.len(), 5);
    assert_eq!(store.write_count(), 3);
    let renamed = planner
        .series(&lectures.base_id)
        .unwrap()
        .into_iter()
        .filter(|e| e.title == "Calculus II")
        .count();
    assert_eq!(renamed, 5);

    planner.delete_event(&dentist.base_id, Scope::All).unwrap();
    assert_eq!(store.write_count(), 4);
    assert_eq!(planner.events().len(), 9);
}

#[test]
fn test_failed_mutations_do_not_write() {
    let store = MemoryStore::new();
    let mut planner = Planner::from_config(&store, &store, &Config::default()).unwrap();
    let created_series = planner
        .create_event(
            &EventDraft::new("Run", date(2025, 9, 1)).repeating(RepeatKind::Daily),
            created(),
        )
        .unwrap();
    let before = planner.events().clone();

    let missing = planner.edit_event(
        &EventId::from("nope"),
        Scope::All,
        &EventDraft::new("Run", date(2025, 9, 1)),
    );
    assert!(matches!(missing, Err(CoreError::NotFound(_))));

    let invalid = planner.edit_event(
        &created_series.base_id,
        Scope::All,
        &EventDraft::new("  ", date(2025, 9, 1)),
    );
    assert!(matches!(invalid, Err(CoreError::Validation(_))));

    assert_eq!(store.write_count(), 1);
    assert_eq!(planner.events(), &before);
}

#[test]
fn test_reload_picks_up_external_snapshot() {
    let store = MemoryStore::new();
    let mut planner = Planner::from_config(&store, &store, &Config::default()).unwrap();
    planner
        .create_event(&EventDraft::new("Call", date(2025, 9, 3)), created())
        .unwrap();

    let mut other = Planner::from_config(&store, &store, &Config::default()).unwrap();
    assert_eq!(other.events().len(), 1);

    planner
        .create_event(&EventDraft::new("Lunch", date(2025, 9, 4)), created())
        .unwrap();
    assert_eq!(other.events().len(), 1);
    other.reload().unwrap();
    assert_eq!(other.events().len(), 2);
}
