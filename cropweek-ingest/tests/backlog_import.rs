use chrono::NaiveDate;
use cropweek_core::{PlanRequest, Priority, ScheduleIssue, TaskCatalog, TaskKind, WeeklyPlanner};
use cropweek_ingest::parse_backlog_csv;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/backlog.csv")
}

#[test]
fn fixture_rows_normalize_into_backlog() {
    let rows = parse_backlog_csv(fixture()).expect("should parse fixture");
    assert_eq!(rows.len(), 6, "blank task row is skipped");

    let input = PlanRequest::default()
        .with_pending(rows)
        .normalize(TaskCatalog::standard());

    let kinds: Vec<&TaskKind> = input.backlog.iter().map(|t| &t.task_kind).collect();
    assert_eq!(kinds[0], &TaskKind::Weeding);
    assert_eq!(kinds[1], &TaskKind::PestControl);
    assert_eq!(kinds[3], &TaskKind::SoilTesting);
    assert!(kinds[4].is_custom());

    assert_eq!(input.backlog[0].id, "weed-north");
    assert_eq!(input.backlog[1].id, "pending_1_pest_control");
    assert_eq!(input.backlog[1].days_pending, 1);
    assert_eq!(input.backlog[3].priority, Priority::Medium);
    assert_eq!(input.backlog[4].priority, Priority::Urgent);

    let irrigation = &input.backlog[5];
    assert_eq!(irrigation.priority, Priority::Medium);
    assert_eq!(irrigation.days_pending, 0);
    assert_eq!(irrigation.estimated_duration, 2);

    // Only the custom "mulching" kind is reported.
    assert_eq!(input.issues.len(), 1);
    assert!(matches!(&input.issues[0], ScheduleIssue::MalformedInput(m) if m.contains("mulching")));
}

#[test]
fn imported_backlog_drives_a_plan() {
    let rows = parse_backlog_csv(fixture()).unwrap();
    let mut planner = WeeklyPlanner::seeded(21);
    let input = PlanRequest::default()
        .with_pending(rows)
        .normalize(planner.catalog());

    let start = NaiveDate::from_ymd_opt(2026, 4, 6).unwrap();
    let plan = planner.build_from(input, start);

    let day0 = plan.days().next().unwrap();
    assert_eq!(day0.backlog_tasks.len(), 2);
    assert!(day0.all_tasks.len() <= 3);
    // "mulch-1" is urgent, so it leads the backlog.
    assert_eq!(day0.backlog_tasks[0].id, "mulch-1");
}

#[test]
fn missing_file_reports_path() {
    let err = parse_backlog_csv("does/not/exist.csv").unwrap_err();
    assert!(format!("{err:#}").contains("does/not/exist.csv"));
}
