//! Newest-first ordering of the listing

use crate::config::TimingConfig;
use crate::crawler::settle::SettlePolicy;
use crate::driver::{PageDriver, Scope};

pub const SORT_TOGGLE_SELECTOR: &str = "#currentSort";
pub const SORT_LATEST_SELECTOR: &str = "#Bid-Start-Date-Latest";

/// Switches the listing to "Bid Start Date: Latest First"
///
/// Missing controls are logged and skipped; sorting never aborts a run.
///
/// # Returns
///
/// `true` when the newest-first option was clicked
pub async fn apply_sort<D: PageDriver>(
    driver: &mut D,
    timing: &TimingConfig,
    settle: &SettlePolicy,
) -> bool {
    match driver.query_selector(Scope::Document, SORT_TOGGLE_SELECTOR).await {
        Ok(Some(toggle)) => {
            if let Err(e) = driver.click(&toggle).await {
                tracing::warn!("Failed to open sort menu: {}", e);
            }
        }
        Ok(None) => tracing::warn!("Sort menu toggle not found; skipping"),
        Err(e) => tracing::warn!("Sort menu lookup failed: {}", e),
    }

    driver.sleep(timing.sort_menu_delay()).await;

    let option = match driver.query_selector(Scope::Document, SORT_LATEST_SELECTOR).await {
        Ok(option) => option,
        Err(e) => {
            tracing::warn!("Sort option lookup failed: {}", e);
            None
        }
    };

    let Some(option) = option else {
        tracing::warn!("Sort option not found; continuing with site ordering");
        return false;
    };

    if let Err(e) = driver.click(&option).await {
        tracing::warn!("Failed to select newest-first ordering: {}", e);
        return false;
    }
    settle.settle(&*driver).await;
    tracing::info!("Applied newest-first ordering");
    true
}
