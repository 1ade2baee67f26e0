//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and
//! associated error types.

use crate::crawler::TraversalReport;
use crate::state::Direction;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for output handlers
///
/// A handler is told when a run begins, receives the finished report, or is
/// told the run was aborted before it produced one.
pub trait OutputHandler {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Called before the driver is opened
    fn begin(&mut self, _direction: Direction) -> OutputResult<()> {
        Ok(())
    }

    /// Persists the outcome of a finished traversal
    ///
    /// # Arguments
    ///
    /// * `report` - Records, totals and termination reason of the run
    fn write_report(&mut self, report: &TraversalReport) -> OutputResult<()>;

    /// Called instead of `write_report` when the run failed outright
    fn abort(&mut self, _error: &str) -> OutputResult<()> {
        Ok(())
    }
}
