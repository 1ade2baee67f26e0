//! Output module for run artifacts and summaries
//!
//! This module handles:
//! - Writing the CSV artifact
//! - Recording runs and their records in SQLite
//! - Summarizing finished runs

mod csv_output;
mod sqlite_output;
pub mod stats;
mod traits;

pub use csv_output::{csv_path, default_csv_name, write_records, CsvOutput, FORWARD_CSV_NAME};
pub use sqlite_output::SqliteOutput;
pub use stats::{print_run, print_summary, RunSummary};
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::config::Config;
use crate::storage::SqliteStorage;
use crate::GemError;
use std::path::Path;

/// Builds the output handlers a configuration asks for
///
/// The CSV artifact is always written; a SQLite handler is added when a
/// database path is configured.
///
/// # Arguments
///
/// * `config` - The loaded configuration
/// * `config_hash` - Hash recorded with stored runs
///
/// # Returns
///
/// * `Ok(Vec<...>)` - Handlers in the order they should be invoked
/// * `Err(GemError)` - The database could not be opened
pub fn build_handlers(
    config: &Config,
    config_hash: &str,
) -> Result<Vec<Box<dyn OutputHandler + Send>>, GemError> {
    let mut handlers: Vec<Box<dyn OutputHandler + Send>> =
        vec![Box::new(CsvOutput::from_config(&config.output))];

    if let Some(database_path) = &config.output.database_path {
        let storage = SqliteStorage::new(Path::new(database_path))?;
        handlers.push(Box::new(SqliteOutput::new(Box::new(storage), config_hash)));
    }

    Ok(handlers)
}
