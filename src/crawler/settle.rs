//! Post-action settle waits

use crate::config::TimingConfig;
use crate::driver::{PageDriver, Scope};
use std::time::Duration;

/// Interval between selector probes while settling
const SETTLE_POLL: Duration = Duration::from_millis(100);

/// How the traversal waits for the page after a navigation or click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Sleep for a fixed duration
    Fixed(Duration),

    /// Poll until `selector` matches, giving up after `timeout`
    UntilSelector {
        selector: String,
        timeout: Duration,
        poll: Duration,
    },
}

impl SettlePolicy {
    /// Builds the policy described by the timing configuration
    ///
    /// A configured `settle-selector` switches to polling, bounded by the
    /// settle delay.
    pub fn from_timing(timing: &TimingConfig) -> Self {
        match &timing.settle_selector {
            Some(selector) => Self::UntilSelector {
                selector: selector.clone(),
                timeout: timing.settle_delay(),
                poll: SETTLE_POLL,
            },
            None => Self::Fixed(timing.settle_delay()),
        }
    }

    pub async fn settle<D: PageDriver>(&self, driver: &D) {
        match self {
            Self::Fixed(duration) => driver.sleep(*duration).await,
            Self::UntilSelector {
                selector,
                timeout,
                poll,
            } => {
                // Waited time is accounted per poll so the loop ends even when
                // the driver's sleep returns immediately
                let mut waited = Duration::ZERO;
                loop {
                    match driver.query_selector(Scope::Document, selector).await {
                        Ok(Some(_)) => return,
                        Ok(None) => {}
                        Err(e) => tracing::debug!("Settle probe '{}' failed: {}", selector, e),
                    }
                    if waited >= *timeout {
                        tracing::warn!(
                            "Selector '{}' did not appear within {:?}; continuing",
                            selector,
                            timeout
                        );
                        return;
                    }
                    driver.sleep(*poll).await;
                    waited += (*poll).max(Duration::from_millis(1));
                }
            }
        }
    }
}
