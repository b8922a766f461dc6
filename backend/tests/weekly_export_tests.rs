//! Integration tests for the weekly export over the local repository.

use chrono::{TimeZone, Utc};

use turni::db::LocalRepository;
use turni::models::{Assignment, Role, RoleId, ShiftGroup, Weekday, Worker, WorkerId};
use turni::services::{load_weekly_export, render_text, ExportRow, EXPORT_FILE_NAME};

fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    for (id, code) in [(1, "CARR 1"), (2, "CF"), (3, "BART"), (4, "GUARD")] {
        repo.insert_role(Role::new(id, code));
    }
    repo.insert_worker(Worker::new(10, "Alice", ShiftGroup::A));
    repo.insert_worker(Worker::new(11, "Bob", ShiftGroup::A));
    repo.insert_worker(Worker::new(20, "Carla", ShiftGroup::B));
    repo.insert_worker(Worker::new(30, "Dario", ShiftGroup::C));
    repo
}

fn put(repo: &LocalRepository, day: Weekday, group: ShiftGroup, role: i64, worker: i64) {
    repo.insert_assignment(Assignment::new(day, group, RoleId(role), WorkerId(worker)));
}

#[tokio::test]
async fn test_export_covers_every_shift() {
    let repo = seeded_repo();
    put(&repo, Weekday::Thursday, ShiftGroup::A, 2, 10);
    put(&repo, Weekday::Thursday, ShiftGroup::C, 3, 30);

    let generated_at = Utc.with_ymd_and_hms(2025, 6, 2, 7, 30, 0).unwrap();
    let outcome = load_weekly_export(&repo, generated_at).await;
    assert!(!outcome.is_degraded());

    let export = outcome.data;
    assert_eq!(export.generated_at, generated_at);
    assert_eq!(export.pages.len(), 7);

    let thursday = export.page(Weekday::Thursday);
    assert_eq!(
        thursday.table(ShiftGroup::A).rows,
        vec![ExportRow::new("CF", "Alice")]
    );
    assert_eq!(
        thursday.table(ShiftGroup::B).rows,
        vec![ExportRow::new("-", "-")]
    );
    assert_eq!(
        thursday.table(ShiftGroup::C).rows,
        vec![ExportRow::new("BART", "Dario")]
    );

    for day in Weekday::WEEK {
        if day == Weekday::Thursday {
            continue;
        }
        for table in &export.page(day).tables {
            assert_eq!(table.rows, vec![ExportRow::new("-", "-")]);
        }
    }
}

#[tokio::test]
async fn test_unlisted_roles_sort_before_listed_ones() {
    let repo = seeded_repo();
    put(&repo, Weekday::Monday, ShiftGroup::A, 1, 10);
    put(&repo, Weekday::Monday, ShiftGroup::A, 4, 11);
    put(&repo, Weekday::Monday, ShiftGroup::A, 2, 20);

    let export = load_weekly_export(&repo, Utc::now()).await.data;
    let codes: Vec<&str> = export
        .page(Weekday::Monday)
        .table(ShiftGroup::A)
        .rows
        .iter()
        .map(|row| row.role.as_str())
        .collect();

    assert_eq!(codes, vec!["GUARD", "CF", "CARR 1"]);
}

#[tokio::test]
async fn test_failed_reads_degrade_to_placeholders() {
    let repo = seeded_repo();
    put(&repo, Weekday::Monday, ShiftGroup::A, 2, 10);
    repo.set_fail_reads(true);

    let outcome = load_weekly_export(&repo, Utc::now()).await;
    assert!(outcome.is_degraded());

    for page in &outcome.data.pages {
        for table in &page.tables {
            assert_eq!(table.rows, vec![ExportRow::new("-", "-")]);
        }
    }
}

#[tokio::test]
async fn test_rendered_document_has_one_page_per_day() {
    let repo = seeded_repo();
    put(&repo, Weekday::Saturday, ShiftGroup::B, 2, 20);

    let export = load_weekly_export(&repo, Utc::now()).await.data;
    let text = render_text(&export);
    let pages: Vec<&str> = text.split('\x0c').collect();

    assert_eq!(pages.len(), 7);
    for (page, day) in pages.iter().zip(Weekday::WEEK) {
        assert!(page.trim_start().starts_with(day.label()));
    }
    assert!(pages[5].contains("CF    | Carla"));
    assert_eq!(EXPORT_FILE_NAME, "Turni_Settimanali.txt");
}
