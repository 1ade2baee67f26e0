//! Configuration module for gem-tenders
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use gem_tenders::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gem.toml")).unwrap();
//! println!("Listing URL: {}", config.listing_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, OutputConfig, SiteConfig, TimingConfig, TraversalConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::validate;
