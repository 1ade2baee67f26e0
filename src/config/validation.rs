use crate::config::types::{Config, OutputConfig, SiteConfig, TimingConfig, TraversalConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_traversal_config(&config.traversal)?;
    validate_timing_config(&config.timing)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if url.path() != "/" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must be an origin without a path",
            config.base_url
        )));
    }

    if !config.listing_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing-path must start with '/', got '{}'",
            config.listing_path
        )));
    }

    Ok(())
}

/// Validates traversal bounds
fn validate_traversal_config(config: &TraversalConfig) -> Result<(), ConfigError> {
    if config.stop_page < 1 {
        return Err(ConfigError::Validation(format!(
            "stop-page must be >= 1, got {}",
            config.stop_page
        )));
    }

    Ok(())
}

/// Validates delays and scroll settings
fn validate_timing_config(config: &TimingConfig) -> Result<(), ConfigError> {
    if config.settle_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "settle-ms must be >= 100ms, got {}ms",
            config.settle_ms
        )));
    }

    if config.scroll_steps > 50 {
        return Err(ConfigError::Validation(format!(
            "scroll-steps must be <= 50, got {}",
            config.scroll_steps
        )));
    }

    if let Some(selector) = &config.settle_selector {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(
                "settle-selector cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if let Some(csv_name) = &config.csv_name {
        validate_file_name(csv_name)?;

        if !csv_name.ends_with(".csv") {
            return Err(ConfigError::Validation(format!(
                "csv-name must end with '.csv', got '{}'",
                csv_name
            )));
        }
    }

    if let Some(path) = &config.database_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "database-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Artifact names are served by name, so they must not carry path components
fn validate_file_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "csv-name cannot be empty".to_string(),
        ));
    }

    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(ConfigError::Validation(format!(
            "csv-name must be a plain file name, got '{}'",
            name
        )));
    }

    Ok(())
}
