//! End-to-end traversals over synthetic listings

use crate::fixtures::{cards, listing, listing_page, Card};
use crate::support::{create_test_config, FlakyDriver, UnreachableDriver, BASE_URL};
use gem_tenders::driver::SnapshotDriver;
use gem_tenders::{Coordinator, Direction, GemError, ProgressReporter, TerminationReason};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

fn config(direction: Direction, stop_page: u32) -> (TempDir, Arc<gem_tenders::Config>) {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.traversal.direction = direction;
    config.traversal.stop_page = stop_page;
    (dir, Arc::new(config))
}

#[tokio::test]
async fn test_twelve_records_over_two_pages() {
    let (_dir, config) = config(Direction::Forward, 1);
    let progress = ProgressReporter::new();
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(listing(2, 6)), config, progress.clone());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.records.len(), 12);
    assert_eq!(report.total_records_expected, 12);
    assert_eq!(report.total_pages, 2);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.termination, TerminationReason::ReachedLastPage);
    assert!(report.reconciliation().is_complete());
    assert_eq!(report.reconciliation().delta(), 0);

    assert!(report.records[..6].iter().all(|r| r.page == 1));
    assert!(report.records[6..].iter().all(|r| r.page == 2));
    assert_eq!(report.records[0].bid_number, "GEM/2025/B/1");
    assert_eq!(report.records[11].bid_number, "GEM/2025/B/12");

    for record in &report.records {
        assert!(record.detail_url.starts_with(&format!("{}/", BASE_URL)));
        assert!(!record.detail_url.contains("//showbidDocument"));
    }

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.current, 2);
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.message, "Scraping page 2...");
    assert!(!snapshot.is_complete());
    assert!(coordinator.driver().is_closed());
}

#[tokio::test]
async fn test_missing_department_yields_empty_field() {
    let (_dir, config) = config(Direction::Forward, 1);
    let page = listing_page(
        1,
        1,
        2,
        &[Card::numbered(1), Card::numbered(2).without_department()],
    );
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(vec![page]), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].department, "Department 1");
    assert_eq!(report.records[1].department, "");
    assert_eq!(report.records[1].items, "Item 2");
    assert_eq!(report.records[1].quantity, "2");
}

#[tokio::test]
async fn test_single_page_listing_without_next_control() {
    let (_dir, config) = config(Direction::Forward, 1);
    let page = listing_page(1, 1, 3, &cards(1, 3));
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(vec![page]), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_pages, 1);
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.termination, TerminationReason::ReachedLastPage);
}

#[tokio::test]
async fn test_missing_next_control_ends_walk_early() {
    let (_dir, config) = config(Direction::Forward, 1);
    // Page 2 renders as if it were the last page of two
    let pages = vec![
        listing_page(1, 3, 6, &cards(1, 2)),
        listing_page(2, 2, 6, &cards(3, 2)),
        listing_page(3, 3, 6, &cards(5, 2)),
    ];
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(pages), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.termination, TerminationReason::NoNextControl);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.reconciliation().delta(), 2);
    assert!(!report.is_premature());
}

#[tokio::test]
async fn test_forward_never_exceeds_advertised_pages() {
    let (_dir, config) = config(Direction::Forward, 1);
    // The listing claims two pages but the pagination keeps offering "next"
    let mut pages: Vec<String> = (1..=4)
        .map(|page| listing_page(page, 4, 8, &cards(page * 2 - 1, 2)))
        .collect();
    pages[0] = pages[0].replace(
        r##"<a href="#page-4" class="page-link">4</a>"##,
        r##"<a href="#page-4" class="page-link">2</a>"##,
    );
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(pages), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.total_pages, 2);
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.termination, TerminationReason::ReachedLastPage);
}

#[tokio::test]
async fn test_backward_walk_stops_at_stop_page() {
    let (_dir, config) = config(Direction::Backward, 4);
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(listing(6, 2)), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.termination, TerminationReason::ReachedStopPage);
    assert_eq!(report.pages_visited, 3);
    let pages: Vec<u32> = report.records.iter().map(|r| r.page).collect();
    assert_eq!(pages, vec![6, 6, 5, 5, 4, 4]);
    assert_eq!((report.start_page, report.end_page), (6, 4));
    assert_eq!(report.records[0].bid_number, "GEM/2025/B/11");
    assert!(report.records.iter().all(|r| r.page >= 4));
}

#[tokio::test]
async fn test_backward_walk_to_first_page() {
    let (_dir, config) = config(Direction::Backward, 1);
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(listing(3, 2)), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.termination, TerminationReason::ReachedStopPage);
    assert_eq!(report.records.len(), 6);
    assert!(report.reconciliation().is_complete());
}

#[tokio::test]
async fn test_missing_previous_control_is_premature() {
    let (_dir, config) = config(Direction::Backward, 1);
    // Page 3 renders its pagination as page 1, so it has no "previous" link
    let pages = vec![
        listing_page(1, 4, 8, &cards(1, 2)),
        listing_page(2, 4, 8, &cards(3, 2)),
        listing_page(1, 4, 8, &cards(5, 2)),
        listing_page(4, 4, 8, &cards(7, 2)),
    ];
    let mut coordinator =
        Coordinator::new(SnapshotDriver::new(pages), config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.termination, TerminationReason::NoPreviousControl);
    assert!(report.is_premature());
    let bids: Vec<&str> = report.records.iter().map(|r| r.bid_number.as_str()).collect();
    assert_eq!(
        bids,
        vec!["GEM/2025/B/7", "GEM/2025/B/8", "GEM/2025/B/5", "GEM/2025/B/6"]
    );
}

#[tokio::test]
async fn test_driver_failure_keeps_partial_results() {
    let (_dir, config) = config(Direction::Forward, 1);
    // Two clicks for sorting and one "next" succeed, the second "next" fails
    let driver = FlakyDriver::new(listing(4, 3), 3);
    let mut coordinator = Coordinator::new(driver, config, ProgressReporter::new());

    let report = coordinator.run().await.unwrap();

    match &report.termination {
        TerminationReason::DriverFailure(message) => assert!(message.contains("target crashed")),
        other => panic!("unexpected termination {:?}", other),
    }
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.records.len(), 6);
    assert!(coordinator.driver().is_closed());
}

#[tokio::test]
async fn test_unreachable_listing_is_an_error() {
    let (_dir, config) = config(Direction::Forward, 1);
    let driver = UnreachableDriver::default();
    let closed = Arc::clone(&driver.closed);
    let mut coordinator = Coordinator::new(driver, config, ProgressReporter::new());

    let result = coordinator.run().await;

    assert!(matches!(result, Err(GemError::Driver(_))));
    assert!(closed.load(Ordering::SeqCst));
}
