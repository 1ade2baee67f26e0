//! Run summaries
//!
//! This module builds the end-of-run summary and prints it, along with stored
//! runs from the database.

use crate::crawler::TraversalReport;
use crate::state::Direction;
use crate::storage::RunRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scraped_records: u64,
    pub expected_records: u64,
    pub pages_visited: u32,
    pub total_pages: u32,
    pub direction: Direction,
    pub termination: String,
    pub premature: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub csv_path: PathBuf,
}

impl RunSummary {
    pub fn from_report(
        report: &TraversalReport,
        started_at: DateTime<Utc>,
        csv_path: PathBuf,
    ) -> Self {
        let reconciliation = report.reconciliation();
        Self {
            scraped_records: reconciliation.scraped,
            expected_records: reconciliation.expected,
            pages_visited: report.pages_visited,
            total_pages: report.total_pages,
            direction: report.direction,
            termination: report.termination.to_string(),
            premature: report.is_premature(),
            started_at,
            finished_at: Utc::now(),
            csv_path,
        }
    }

    /// Records still missing; negative when more were scraped than advertised
    pub fn delta(&self) -> i64 {
        self.expected_records as i64 - self.scraped_records as i64
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    println!("Records:");
    println!("  Scraped: {}", summary.scraped_records);
    println!("  Expected: {}", summary.expected_records);
    println!("  Missing: {}", summary.delta());
    println!();

    println!("Traversal:");
    println!("  Direction: {}", summary.direction);
    println!(
        "  Pages visited: {} of {}",
        summary.pages_visited, summary.total_pages
    );
    println!("  Termination: {}", summary.termination);
    if summary.premature {
        println!("  WARNING: traversal ended early; the dataset is incomplete");
    }
    println!();

    println!("Duration: {}s", summary.duration_seconds());
    println!("Output: {}", summary.csv_path.display());
}

/// Prints a stored run to stdout
pub fn print_run(run: &RunRecord, stored_records: u64) {
    println!("=== Run {} ===\n", run.id);
    println!("  Status: {}", run.status.to_db_string());
    println!("  Direction: {}", run.direction);
    println!("  Started: {}", run.started_at);
    println!(
        "  Finished: {}",
        run.finished_at.as_deref().unwrap_or("(not finished)")
    );
    println!("  Config hash: {}", run.config_hash);
    println!();
    println!(
        "  Records: {} scraped / {} expected ({} stored)",
        run.scraped_records, run.expected_records, stored_records
    );
    println!("  Total pages: {}", run.total_pages);
    if let Some(termination) = &run.termination {
        println!("  Termination: {}", termination);
    }
}
