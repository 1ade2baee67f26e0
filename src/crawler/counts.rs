//! Listing record and page counts

use crate::config::Config;
use crate::crawler::settle::SettlePolicy;
use crate::crawler::sort::apply_sort;
use crate::driver::{NavigationWait, PageDriver, Scope};
use crate::state::ProgressReporter;
use crate::DriverResult;
use regex::Regex;
use std::sync::LazyLock;

pub const SUMMARY_SELECTOR: &str = "span.pos-bottom";
pub const LAST_PAGE_LINK_SELECTOR: &str = "#light-pagination a.page-link:nth-last-child(2)";

static RE_TOTAL_RECORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"of\s+(\d+)\s+records").expect("invalid regex: total records")
});

/// Totals advertised by the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingCounts {
    pub total_records: u64,
    pub total_pages: u32,
}

/// Loads the listing, applies ordering and reads the advertised totals
///
/// Page 1 is loaded in the driver afterwards. Missing or malformed summary
/// text falls back to 0 records and 1 page; only a failed navigation is an
/// error.
pub async fn resolve_counts<D: PageDriver>(
    driver: &mut D,
    config: &Config,
    settle: &SettlePolicy,
    progress: &ProgressReporter,
) -> DriverResult<ListingCounts> {
    progress.set_message("Extracting total counts...");

    let url = config.listing_url();
    tracing::info!("Opening listing {}", url);
    driver.navigate(&url, NavigationWait::NetworkIdle).await?;
    settle.settle(&*driver).await;

    if config.traversal.apply_sort {
        progress.set_message("Applying sorting...");
        apply_sort(driver, &config.timing, settle).await;
    }

    let total_records = match read_text(&*driver, SUMMARY_SELECTOR).await {
        Some(text) => parse_total_records(&text),
        None => {
            tracing::warn!("Record summary not found; assuming 0 records");
            0
        }
    };

    let total_pages = match read_text(&*driver, LAST_PAGE_LINK_SELECTOR).await {
        Some(text) => parse_total_pages(&text),
        None => {
            tracing::debug!("No last-page link; assuming a single page");
            1
        }
    };

    tracing::info!(
        "Listing advertises {} records across {} pages",
        total_records,
        total_pages
    );
    Ok(ListingCounts {
        total_records,
        total_pages,
    })
}

async fn read_text<D: PageDriver>(driver: &D, selector: &str) -> Option<String> {
    let element = match driver.query_selector(Scope::Document, selector).await {
        Ok(element) => element?,
        Err(e) => {
            tracing::debug!("Lookup of '{}' failed: {}", selector, e);
            return None;
        }
    };
    driver.text(&element).await.ok()
}

/// Extracts N from text such as "Showing 1 to 10 of 1234 records"
pub fn parse_total_records(text: &str) -> u64 {
    RE_TOTAL_RECORDS
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Parses a pagination label that must be a positive integer
pub fn parse_page_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Total page count from the last numbered pagination link, defaulting to 1
pub fn parse_total_pages(text: &str) -> u32 {
    parse_page_number(text).unwrap_or(1)
}
