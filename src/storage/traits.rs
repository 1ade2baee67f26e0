//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::TenderRecord;
use crate::state::Direction;
use crate::storage::{RunOutcome, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `Running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    /// * `direction` - Direction the run walks the listing
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str, direction: Direction) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records how a run ended and stamps its finish time
    fn complete_run(&mut self, run_id: i64, outcome: &RunOutcome) -> StorageResult<()>;

    /// Marks a run as failed, keeping `message` as its termination note
    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()>;

    // ===== Records =====

    /// Appends records to a run, preserving their order
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn insert_records(&mut self, run_id: i64, records: &[TenderRecord]) -> StorageResult<usize>;

    /// Counts the records stored for a run
    fn count_records(&self, run_id: i64) -> StorageResult<u64>;

    /// Loads a run's records in insertion order
    fn load_records(&self, run_id: i64) -> StorageResult<Vec<TenderRecord>>;
}
