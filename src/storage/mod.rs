//! Storage module for persisting runs and harvested records
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking (status, totals, termination)
//! - Per-run record persistence

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::{TerminationReason, TraversalReport};
use crate::state::Direction;
use crate::GemError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(GemError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, GemError> {
    SqliteStorage::new(path)
}

/// Represents a traversal run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub direction: Direction,
    pub status: RunStatus,
    pub expected_records: u64,
    pub total_pages: u32,
    pub scraped_records: u64,
    pub termination: Option<String>,
}

/// Totals recorded when a run finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub expected_records: u64,
    pub total_pages: u32,
    pub scraped_records: u64,
    pub termination: String,
}

impl RunOutcome {
    pub fn from_report(report: &TraversalReport) -> Self {
        Self {
            status: RunStatus::for_termination(&report.termination),
            expected_records: report.total_records_expected,
            total_pages: report.total_pages,
            scraped_records: report.records.len() as u64,
            termination: report.termination.to_string(),
        }
    }
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    /// Stopped before its bound; the stored records are incomplete
    Partial,
    Failed,
}

impl RunStatus {
    pub fn for_termination(reason: &TerminationReason) -> Self {
        if reason.is_premature() {
            Self::Partial
        } else {
            Self::Completed
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "partial" => Some(Self::Partial),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
