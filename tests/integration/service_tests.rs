//! Run service: single-run guard, progress and artifacts

use crate::fixtures::listing;
use crate::support::{create_test_config, BrokenFactory, GatedFactory};
use gem_tenders::driver::SnapshotFactory;
use gem_tenders::storage::{RunStatus, SqliteStorage, Storage};
use gem_tenders::{Direction, ScrapeService, TriggerStatus};
use tempfile::TempDir;

#[tokio::test]
async fn test_second_trigger_rejected_while_running() {
    let dir = TempDir::new().unwrap();
    let (factory, gate) = GatedFactory::new(listing(2, 6));
    let service = ScrapeService::new(factory, create_test_config(dir.path()), "hash");

    assert_eq!(service.start(), TriggerStatus::Started);
    assert!(service.is_running());
    assert_eq!(service.start(), TriggerStatus::AlreadyRunning);
    assert_eq!(service.progress().message, "Starting...");

    gate.notify_one();
    let summary = service.wait().await.unwrap().unwrap();
    assert_eq!(summary.scraped_records, 12);
    assert!(!service.is_running());

    // The guard is free again once the run has finished
    gate.notify_one();
    assert_eq!(service.start(), TriggerStatus::Started);
    assert!(service.wait().await.unwrap().is_ok());
}

#[tokio::test]
async fn test_progress_persists_after_completion() {
    let dir = TempDir::new().unwrap();
    let service = ScrapeService::new(
        SnapshotFactory::from_pages(listing(2, 6)),
        create_test_config(dir.path()),
        "hash",
    );
    let mut rx = service.progress_reporter().subscribe();

    service.start();
    let state = rx.wait_for(|state| state.is_complete()).await.unwrap().clone();
    assert_eq!(state.current, 2);
    assert_eq!(state.total, 2);

    service.wait().await.unwrap().unwrap();
    assert!(service.progress().is_complete());
    assert_eq!(service.progress().current, 2);
}

#[tokio::test]
async fn test_artifact_exists_when_completion_is_published() {
    let dir = TempDir::new().unwrap();
    let service = ScrapeService::new(
        SnapshotFactory::from_pages(listing(2, 3)),
        create_test_config(dir.path()),
        "hash",
    );
    let mut rx = service.progress_reporter().subscribe();

    service.start();
    rx.wait_for(|state| state.is_complete()).await.unwrap();

    let path = service.artifact("gem_full_fixed.csv").unwrap();
    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(reader.records().count(), 6);

    // Completion means the guard takes a new trigger
    assert!(!service.is_running());
    assert_eq!(service.start(), TriggerStatus::Started);
    assert!(service.wait().await.unwrap().is_ok());
}

#[tokio::test]
async fn test_backward_run_writes_reverse_artifact() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.traversal.direction = Direction::Backward;
    config.traversal.stop_page = 2;

    let service = ScrapeService::new(SnapshotFactory::from_pages(listing(3, 2)), config, "hash");
    service.start();
    let summary = service.wait().await.unwrap().unwrap();

    assert_eq!(summary.scraped_records, 4);
    assert_eq!(summary.csv_path, dir.path().join("gem_reverse_3_to_2.csv"));
    assert!(service.artifact("gem_reverse_3_to_2.csv").is_some());
    assert!(service.artifact("gem_full_fixed.csv").is_none());
}

#[tokio::test]
async fn test_csv_artifact_is_served_after_run() {
    let dir = TempDir::new().unwrap();
    let service = ScrapeService::new(
        SnapshotFactory::from_pages(listing(2, 6)),
        create_test_config(dir.path()),
        "hash",
    );
    assert!(service.artifact("gem_full_fixed.csv").is_none());

    service.start();
    service.wait().await.unwrap().unwrap();

    let path = service.artifact("gem_full_fixed.csv").unwrap();
    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), 8);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 12);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][2], "https://bidplus.gem.gov.in/showbidDocument/1");
    assert_eq!(&rows[11][0], "2");

    assert!(service.artifact("../gem_full_fixed.csv").is_none());
}

#[tokio::test]
async fn test_run_recorded_in_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("tenders.db");
    let mut config = create_test_config(dir.path());
    config.output.database_path = Some(db_path.display().to_string());

    let service = ScrapeService::new(SnapshotFactory::from_pages(listing(2, 6)), config, "cfg-hash");
    service.start();
    service.wait().await.unwrap().unwrap();

    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "cfg-hash");
    assert_eq!(run.expected_records, 12);
    assert_eq!(run.scraped_records, 12);
    assert_eq!(storage.count_records(run.id).unwrap(), 12);
    assert_eq!(storage.load_records(run.id).unwrap()[0].bid_number, "GEM/2025/B/1");
}

#[tokio::test]
async fn test_failed_launch_reports_failure_and_releases_guard() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("tenders.db");
    let mut config = create_test_config(dir.path());
    config.output.database_path = Some(db_path.display().to_string());
    let service = ScrapeService::new(BrokenFactory, config, "hash");

    service.start();
    let result = service.wait().await.unwrap();

    assert!(result.is_err());
    assert!(service
        .progress()
        .message
        .starts_with("Scraping failed: "));
    assert!(!service.is_running());
    assert!(service.artifact("gem_full_fixed.csv").is_none());

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(
        storage.get_latest_run().unwrap().unwrap().status,
        RunStatus::Failed
    );
}

#[tokio::test]
async fn test_replay_from_directory() {
    let dir = TempDir::new().unwrap();
    let snapshots = dir.path().join("snapshots");
    std::fs::create_dir_all(&snapshots).unwrap();
    for (index, page) in listing(3, 4).iter().enumerate() {
        std::fs::write(snapshots.join(format!("page-{}.html", index + 1)), page).unwrap();
    }

    let service = ScrapeService::new(
        SnapshotFactory::from_dir(&snapshots),
        create_test_config(&dir.path().join("out")),
        "hash",
    );
    service.start();
    let summary = service.wait().await.unwrap().unwrap();

    assert_eq!(summary.scraped_records, 12);
    assert_eq!(summary.pages_visited, 3);
    assert!(summary.csv_path.exists());
}
