//! Tests for single-plan and batch workout generation.

use std::fs;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use zwogen::storage::database::Database;
use zwogen::workouts::generator::{generate_range, generate_workout};
use zwogen::workouts::types::{GenerateError, Interval, PowerTarget, PowerUnit, WorkoutPlan};

fn plan(date: NaiveDate, name: &str, intervals: Vec<Interval>) -> WorkoutPlan {
    WorkoutPlan {
        id: Uuid::new_v4(),
        date,
        name: name.to_string(),
        activity_type: "bike".to_string(),
        description: None,
        intervals,
        ftp: None,
        created_at: Utc::now(),
    }
}

fn steady_interval(name: &str, duration: u32, target: PowerTarget) -> Interval {
    Interval {
        name: Some(name.to_string()),
        duration_seconds: duration,
        power_target: target,
        cadence_target: None,
    }
}

#[test]
fn test_generate_workout_writes_and_repairs_file() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    let p = plan(
        date,
        "Endurance",
        vec![steady_interval(
            "Steady",
            3600,
            PowerTarget::percent_ftp(65.0),
        )],
    );

    let path = generate_workout(&p, 258, dir.path()).unwrap();
    assert!(path.exists());

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("<name>03/02 Endurance</name>"));
    assert!(!content.contains("<n>"));
}

#[test]
fn test_generate_workout_prefers_plan_ftp() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
    let mut p = plan(
        date,
        "Threshold",
        vec![steady_interval("Work", 1200, PowerTarget::watts(200.0))],
    );
    p.ftp = Some(200);

    let path = generate_workout(&p, 258, dir.path()).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    // 200 W at the plan's 200 W FTP is exactly threshold.
    assert!(content.contains(r#"Power="1""#));
}

#[test]
fn test_generate_workout_rejects_empty_plan() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
    let p = plan(date, "Ghost", Vec::new());

    match generate_workout(&p, 258, dir.path()) {
        Err(GenerateError::NoIntervals { name, .. }) => assert_eq!(name, "Ghost"),
        other => panic!("expected NoIntervals, got {:?}", other),
    }
}

#[test]
fn test_resolve_failure_reports_interval_index() {
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
    let p = plan(
        date,
        "Broken",
        vec![
            steady_interval("Warmup", 600, PowerTarget::percent_ftp(50.0)),
            steady_interval(
                "Bad",
                600,
                PowerTarget::range(95.0, 55.0, Some(PowerUnit::PercentFtp)),
            ),
        ],
    );

    match generate_workout(&p, 258, dir.path()) {
        Err(GenerateError::Resolve { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected Resolve error, got {:?}", other),
    }
}

#[test]
fn test_batch_isolates_per_plan_failures() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();

    db.insert_plan(&plan(
        monday,
        "Good Ride",
        vec![steady_interval(
            "Steady",
            1800,
            PowerTarget::percent_ftp(65.0),
        )],
    ))
    .unwrap();

    db.insert_plan(&plan(
        monday.succ_opt().unwrap(),
        "Bad Ride",
        vec![steady_interval(
            "Inverted",
            600,
            PowerTarget::range(95.0, 55.0, Some(PowerUnit::PercentFtp)),
        )],
    ))
    .unwrap();

    db.insert_plan(&plan(
        monday.succ_opt().unwrap().succ_opt().unwrap(),
        "Another Good Ride",
        vec![steady_interval("Tempo", 1200, PowerTarget::watts(220.0))],
    ))
    .unwrap();

    let end = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    let report = generate_range(&db, monday, end, 258, dir.path()).unwrap();

    assert_eq!(report.written.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "Bad Ride");
    for path in &report.written {
        assert!(path.exists());
    }
}

#[test]
fn test_batch_skips_plans_without_intervals() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();

    db.insert_plan(&plan(date, "Rest Day Spin", Vec::new())).unwrap();

    let report = generate_range(&db, date, date, 258, dir.path()).unwrap();
    assert!(report.written.is_empty());
    // A plan without intervals is filtered, not failed.
    assert!(report.failures.is_empty());
}

#[test]
fn test_batch_regeneration_overwrites_deterministically() {
    let db = Database::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();

    db.insert_plan(&plan(
        date,
        "Repeatable",
        vec![steady_interval(
            "Main",
            2400,
            PowerTarget::percent_ftp(80.0),
        )],
    ))
    .unwrap();

    let first = generate_range(&db, date, date, 258, dir.path()).unwrap();
    let bytes_first = fs::read(&first.written[0]).unwrap();

    let second = generate_range(&db, date, date, 258, dir.path()).unwrap();
    let bytes_second = fs::read(&second.written[0]).unwrap();

    assert_eq!(first.written, second.written);
    assert_eq!(bytes_first, bytes_second);
}
