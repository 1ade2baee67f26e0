//! SQLite-based output handler implementation
//!
//! This module provides an output handler that records each run and its
//! records directly to the SQLite storage backend.

use crate::crawler::TraversalReport;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use crate::state::Direction;
use crate::storage::{RunOutcome, Storage};

/// SQLite-based output handler
pub struct SqliteOutput {
    storage: Box<dyn Storage + Send>,
    config_hash: String,
    run_id: Option<i64>,
}

impl SqliteOutput {
    /// Creates a new SQLite output handler
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `config_hash` - Hash of the configuration recorded with each run
    pub fn new(storage: Box<dyn Storage + Send>, config_hash: impl Into<String>) -> Self {
        Self {
            storage,
            config_hash: config_hash.into(),
            run_id: None,
        }
    }

    /// ID of the run created by [`OutputHandler::begin`], if any
    pub fn run_id(&self) -> Option<i64> {
        self.run_id
    }

    fn current_run(&self) -> OutputResult<i64> {
        self.run_id
            .ok_or_else(|| OutputError::Storage("No run has been started".to_string()))
    }
}

fn storage_error(e: crate::storage::StorageError) -> OutputError {
    OutputError::Storage(e.to_string())
}

impl OutputHandler for SqliteOutput {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn begin(&mut self, direction: Direction) -> OutputResult<()> {
        let run_id = self
            .storage
            .create_run(&self.config_hash, direction)
            .map_err(storage_error)?;
        tracing::info!("Recording run {} to database", run_id);
        self.run_id = Some(run_id);
        Ok(())
    }

    fn write_report(&mut self, report: &TraversalReport) -> OutputResult<()> {
        let run_id = self.current_run()?;
        let inserted = self
            .storage
            .insert_records(run_id, &report.records)
            .map_err(storage_error)?;
        self.storage
            .complete_run(run_id, &RunOutcome::from_report(report))
            .map_err(storage_error)?;
        tracing::info!("Stored {} records for run {}", inserted, run_id);
        Ok(())
    }

    fn abort(&mut self, error: &str) -> OutputResult<()> {
        let run_id = self.current_run()?;
        self.storage.fail_run(run_id, error).map_err(storage_error)
    }
}
