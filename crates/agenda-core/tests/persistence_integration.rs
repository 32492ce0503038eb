//! Integration tests for snapshot persistence.
//!
//! These tests use a real SQLite file in a temporary directory and cover
//! reopening, malformed content, and snapshots written by older versions.

use agenda_core::storage::StorageConfig;
use agenda_core::{
    Database, EventDraft, EventStore, ExpansionLimits, Planner, RepeatKind, Scope,
    SubjectRegistry,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn created() -> NaiveDateTime {
    date(2025, 1, 1).and_hms_opt(8, 15, 0).unwrap()
}

fn open_planner(db: &Database) -> Planner<&Database, &Database> {
    Planner::open(db, db, ExpansionLimits::default(), Duration::minutes(120)).unwrap()
}

const LEGACY_SNAPSHOT: &str = r##"[
  {"id": "a1", "title": "Piano", "description": "", "location": "", "type": "event",
   "subject": null, "date": "2025-03-03", "allDay": false, "startTime": "17:00",
   "endTime": "", "color": "#f59e0b", "repeat": "custom",
   "customRecurrence": {"interval": 1, "frequency": "week", "weekdays": [1, 4],
                        "endType": "after", "endAfter": 3},
   "created": "2025-02-20T09:00:00.000Z"},
  {"id": "a2", "title": "Piano", "description": "", "location": "", "type": "event",
   "subject": null, "date": "2025-03-06", "allDay": false, "startTime": "17:00",
   "endTime": "", "color": "#f59e0b", "repeat": "custom",
   "customRecurrence": {"interval": 1, "frequency": "week", "weekdays": [1, 4],
                        "endType": "after", "endAfter": 3},
   "created": "2025-02-20T09:00:00.000Z"},
  {"id": "a3", "title": "Piano", "description": "", "location": "", "type": "event",
   "subject": null, "date": "2025-03-10", "allDay": false, "startTime": "17:00",
   "endTime": "", "color": "#f59e0b", "repeat": "custom",
   "customRecurrence": {"interval": 1, "frequency": "week", "weekdays": [1, 4],
                        "endType": "after", "endAfter": 3},
   "created": "2025-02-20T09:00:00.000Z"},
  {"id": "b1", "title": "Exam", "description": "Chapter 4", "location": "Hall B",
   "type": "class", "subject": "History", "date": "2025-03-12", "allDay": true,
   "startTime": "", "endTime": "", "color": "", "repeat": "none",
   "customRecurrence": null, "created": "2025-02-21T10:00:00.000Z"}
]"##;

#[test]
fn test_snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agenda.db");

    let base_id = {
        let db = Database::open_path(&path, StorageConfig::default()).unwrap();
        let mut planner = open_planner(&db);
        planner
            .create_event(
                &EventDraft::class("Biology", "Science", date(2025, 4, 7))
                    .repeating(RepeatKind::Monthly),
                created(),
            )
            .unwrap()
            .base_id
    };

    let db = Database::open_path(&path, StorageConfig::default()).unwrap();
    let planner = open_planner(&db);
    assert_eq!(planner.events().len(), 13);
    let series = planner.series(&base_id).unwrap();
    assert_eq!(series.len(), 13);
    assert!(series.iter().all(|e| e.subject.as_deref() == Some("Science")));
}

#[test]
fn test_malformed_snapshot_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_path(dir.path().join("agenda.db"), StorageConfig::default()).unwrap();
    db.kv_set("scheduleEvents", "[{\"title\": 42}]").unwrap();

    assert!(db.load_all_events().is_empty());
    let planner = open_planner(&db);
    assert!(planner.events().is_empty());
}

#[test]
fn test_legacy_snapshot_is_migrated_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_path(dir.path().join("agenda.db"), StorageConfig::default()).unwrap();
    db.kv_set("scheduleEvents", LEGACY_SNAPSHOT).unwrap();

    let mut planner = open_planner(&db);
    let piano = planner.get(&"a2".into()).unwrap();
    assert!(piano.series_id.is_some());
    assert!(piano.end_time.is_none());
    assert_eq!(planner.series(&"a2".into()).unwrap().len(), 3);

    let stored = db.load_all_events();
    assert_eq!(stored.len(), 4);
    assert!(stored
        .iter()
        .filter(|e| e.is_recurring())
        .all(|e| e.series_id == piano.series_id));
    assert!(stored.iter().find(|e| e.id.as_str() == "b1").unwrap().series_id.is_none());

    let outcome = planner.delete_event(&"a2".into(), Scope::ThisAndFollowing).unwrap();
    assert_eq!(outcome.affected.len(), 2);
    assert_eq!(db.load_all_events().len(), 2);
}

#[test]
fn test_custom_storage_keys_and_subjects() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageConfig {
        events_key: "events.v2".to_string(),
        subjects_key: "subjects.v2".to_string(),
        default_subjects: vec!["Art".to_string()],
    };
    let db = Database::open_path(dir.path().join("agenda.db"), storage).unwrap();
    assert_eq!(db.list_subjects(), vec!["Art"]);

    let mut planner = open_planner(&db);
    planner
        .create_event(&EventDraft::new("Gallery", date(2025, 5, 1)), created())
        .unwrap();

    assert!(db.kv_get("events.v2").unwrap().is_some());
    assert!(db.kv_get("scheduleEvents").unwrap().is_none());
}
