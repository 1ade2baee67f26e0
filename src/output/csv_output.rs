//! CSV artifact writer

use crate::config::OutputConfig;
use crate::crawler::{TenderRecord, TraversalReport, HEADERS};
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use crate::state::Direction;
use std::path::{Path, PathBuf};

/// Artifact name of a forward run over the whole listing
pub const FORWARD_CSV_NAME: &str = "gem_full_fixed.csv";

/// Artifact name used when `csv-name` is not configured
///
/// Backward runs are named after the page span they walked, so they never
/// replace the full forward dataset.
pub fn default_csv_name(report: &TraversalReport) -> String {
    match report.direction {
        Direction::Forward => FORWARD_CSV_NAME.to_string(),
        Direction::Backward => format!(
            "gem_reverse_{}_to_{}.csv",
            report.start_page, report.end_page
        ),
    }
}

/// Location of a run's CSV artifact under `output`
pub fn csv_path(output: &OutputConfig, report: &TraversalReport) -> PathBuf {
    CsvOutput::from_config(output).path_for(report)
}

/// Writes the harvested records as a CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvOutput {
    directory: PathBuf,
    name: Option<String>,
}

impl CsvOutput {
    /// Creates a writer for `directory`
    ///
    /// # Arguments
    ///
    /// * `directory` - Where artifacts are written
    /// * `name` - Fixed file name; `None` derives one per run
    pub fn new(directory: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self {
            directory: directory.into(),
            name,
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(&output.directory, output.csv_name.clone())
    }

    pub fn path_for(&self, report: &TraversalReport) -> PathBuf {
        let name = match &self.name {
            Some(name) => name.clone(),
            None => default_csv_name(report),
        };
        self.directory.join(name)
    }
}

/// Writes `records` in order to `path`, replacing any previous artifact
///
/// The file is written next to its final location and renamed into place, so
/// readers never observe a half-written artifact.
pub fn write_records(path: &Path, records: &[TenderRecord]) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| OutputError::Write(format!("{} has no file name", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        // Headers are written by hand so an empty run still gets them
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)?;
        writer.write_record(HEADERS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }

    std::fs::rename(&tmp_path, path)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

impl OutputHandler for CsvOutput {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write_report(&mut self, report: &TraversalReport) -> OutputResult<()> {
        write_records(&self.path_for(report), &report.records)
    }
}
