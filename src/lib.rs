//! gem-tenders: a paginated tender-listing harvester
//!
//! This crate drives a browser session through the GeM "all bids" listing,
//! extracts a fixed schema of fields from every listing card, walks the
//! pagination forward or backward, and reconciles the harvested records
//! against the record count the site advertises.

pub mod config;
pub mod crawler;
pub mod driver;
pub mod output;
pub mod service;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for gem-tenders operations
#[derive(Debug, Error)]
pub enum GemError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid traversal transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::Phase,
        to: state::Phase,
    },

    #[error("Page {page} is outside the traversal bounds (1..={total_pages})")]
    PageOutOfBounds { page: u32, total_pages: u32 },

    #[error("Run task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a page driver
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Browser protocol error: {0}")]
    Protocol(String),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Driver session is closed")]
    Closed,
}

/// Result type alias for gem-tenders operations
pub type Result<T> = std::result::Result<T, GemError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for driver operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, TenderRecord, TerminationReason, TraversalReport};
pub use driver::{DriverFactory, PageDriver, Scope};
pub use service::{ScrapeService, TriggerStatus};
pub use state::{Direction, ProgressReporter, ProgressState};
