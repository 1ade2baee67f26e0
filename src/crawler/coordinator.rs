//! Traversal coordinator - walks the listing pagination
//!
//! The coordinator owns the driver for the duration of a run. It resolves the
//! advertised totals, then walks either:
//! - forward from page 1 by following the "next" control, or
//! - backward, after jumping to the last page, by following "previous"
//!
//! Every walk ends gracefully with a [`TerminationReason`]; the driver is
//! closed before a report or error is returned.

use crate::config::Config;
use crate::crawler::counts::{parse_page_number, resolve_counts};
use crate::crawler::extractor::extract_page;
use crate::crawler::report::{TerminationReason, TraversalReport};
use crate::crawler::settle::SettlePolicy;
use crate::crawler::TenderRecord;
use crate::driver::{PageDriver, Scope};
use crate::state::{Direction, Phase, ProgressReporter, TraversalState};
use crate::{DriverResult, GemError};
use std::sync::Arc;

pub const NEXT_SELECTOR: &str = "#light-pagination a.next";
pub const PREV_SELECTOR: &str = "#light-pagination a.prev";
pub const PAGE_LINK_SELECTOR: &str = "#light-pagination a.page-link";

/// Main traversal coordinator structure
pub struct Coordinator<D: PageDriver> {
    driver: D,
    config: Arc<Config>,
    progress: ProgressReporter,
    state: TraversalState,
    settle: SettlePolicy,
}

impl<D: PageDriver> Coordinator<D> {
    /// Creates a coordinator around an open driver session
    ///
    /// # Arguments
    ///
    /// * `driver` - Session the traversal takes exclusive ownership of
    /// * `config` - Site, traversal and timing configuration
    /// * `progress` - Cell that observers poll while the walk runs
    pub fn new(driver: D, config: Arc<Config>, progress: ProgressReporter) -> Self {
        let state = TraversalState::new(config.traversal.direction, config.traversal.stop_page);
        let settle = SettlePolicy::from_timing(&config.timing);
        Self {
            driver,
            config,
            progress,
            state,
            settle,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Runs a complete traversal
    ///
    /// Progress is left on the last page message. Publishing completion is up
    /// to the caller, once the report has been written out.
    ///
    /// # Returns
    ///
    /// * `Ok(TraversalReport)` - The walk ran; the report carries the records
    ///   and the reason it stopped, which may be premature
    /// * `Err(GemError)` - The listing could not be loaded at all
    pub async fn run(&mut self) -> Result<TraversalReport, GemError> {
        self.progress.start();
        tracing::info!(
            "Starting {} traversal of {}",
            self.state.direction,
            self.config.listing_url()
        );

        let counts = match resolve_counts(
            &mut self.driver,
            &self.config,
            &self.settle,
            &self.progress,
        )
        .await
        {
            Ok(counts) => counts,
            Err(e) => {
                tracing::error!("Failed to load listing: {}", e);
                self.state.terminate();
                self.close_driver().await;
                return Err(e.into());
            }
        };

        self.state.resolve(counts.total_records, counts.total_pages)?;
        self.progress.set_total(self.state.total_pages);

        let mut records = Vec::new();
        let walk = match self.state.direction {
            Direction::Forward => self.walk_forward(&mut records).await,
            Direction::Backward => self.walk_backward(&mut records).await,
        };

        let termination = match walk {
            Ok(reason) => reason,
            Err(e) => {
                tracing::error!(
                    "Traversal aborted on page {}: {}",
                    self.state.current_page,
                    e
                );
                TerminationReason::DriverFailure(e.to_string())
            }
        };

        self.state.terminate();
        self.close_driver().await;

        let report = TraversalReport {
            records,
            total_records_expected: self.state.total_records_expected,
            total_pages: self.state.total_pages,
            pages_visited: self.state.pages_visited,
            direction: self.state.direction,
            start_page: self.state.start_page,
            end_page: self.state.end_page(),
            termination,
        };

        let reconciliation = report.reconciliation();
        if reconciliation.is_complete() {
            tracing::info!(
                "Scraped {} of {} expected records ({})",
                reconciliation.scraped,
                reconciliation.expected,
                report.termination
            );
        } else {
            tracing::warn!(
                "Scraped {} of {} expected records, {} missing ({})",
                reconciliation.scraped,
                reconciliation.expected,
                reconciliation.delta(),
                report.termination
            );
        }

        Ok(report)
    }

    async fn walk_forward(
        &mut self,
        records: &mut Vec<TenderRecord>,
    ) -> Result<TerminationReason, GemError> {
        self.state.transition(Phase::PageLoaded)?;

        loop {
            self.extract_current(records).await?;
            self.state.transition(Phase::Advancing)?;

            // The advertised page count wins over whatever controls are shown
            if self.state.at_boundary() {
                return Ok(TerminationReason::ReachedLastPage);
            }

            let Some(next) = self
                .driver
                .query_selector(Scope::Document, NEXT_SELECTOR)
                .await?
            else {
                tracing::info!(
                    "No next control on page {}; stopping",
                    self.state.current_page
                );
                return Ok(TerminationReason::NoNextControl);
            };

            self.driver.click(&next).await?;
            self.settle.settle(&self.driver).await;
            self.state.advance()?;
        }
    }

    async fn walk_backward(
        &mut self,
        records: &mut Vec<TenderRecord>,
    ) -> Result<TerminationReason, GemError> {
        let reached =
            jump_to_last_page(&mut self.driver, self.state.total_pages, &self.settle).await?;
        self.state.start_at(reached)?;
        self.state.transition(Phase::PageLoaded)?;

        if reached < self.state.stop_page {
            tracing::warn!(
                "Highest reachable page {} is below stop page {}; nothing to extract",
                reached,
                self.state.stop_page
            );
            return Ok(TerminationReason::ReachedStopPage);
        }

        loop {
            self.extract_current(records).await?;
            self.state.transition(Phase::Advancing)?;

            if self.state.at_boundary() {
                return Ok(TerminationReason::ReachedStopPage);
            }

            let Some(prev) = self
                .driver
                .query_selector(Scope::Document, PREV_SELECTOR)
                .await?
            else {
                tracing::warn!(
                    "No previous control on page {}; stopping above stop page {}",
                    self.state.current_page,
                    self.state.stop_page
                );
                return Ok(TerminationReason::NoPreviousControl);
            };

            self.driver.click(&prev).await?;
            self.settle.settle(&self.driver).await;
            self.state.advance()?;
        }
    }

    async fn extract_current(&mut self, records: &mut Vec<TenderRecord>) -> Result<(), GemError> {
        self.state.transition(Phase::Extracting)?;
        let page_no = self.state.current_page;
        self.progress.page(page_no);

        let page_records = extract_page(&mut self.driver, page_no, &self.config).await;
        records.extend(page_records);
        self.state.record_visit();
        Ok(())
    }

    async fn close_driver(&mut self) {
        if let Err(e) = self.driver.close().await {
            tracing::warn!("Failed to close driver: {}", e);
        }
    }
}

/// Clicks the highest numbered pagination link until the last page is reached
///
/// Pagination bars usually show only a window of page numbers, so this may take
/// several hops. It stops early when no numeric link is visible or the visible
/// maximum stops increasing.
///
/// # Returns
///
/// The highest page reached, never above `total_pages`
pub async fn jump_to_last_page<D: PageDriver>(
    driver: &mut D,
    total_pages: u32,
    settle: &SettlePolicy,
) -> DriverResult<u32> {
    let mut reached = 1;

    while reached < total_pages {
        let links = driver
            .query_selector_all(Scope::Document, PAGE_LINK_SELECTOR)
            .await?;

        let mut highest: Option<(u32, D::Element)> = None;
        for link in links {
            let Ok(label) = driver.text(&link).await else {
                continue;
            };
            if let Some(n) = parse_page_number(&label) {
                if highest.as_ref().map_or(true, |(max, _)| n > *max) {
                    highest = Some((n, link));
                }
            }
        }

        let Some((target, link)) = highest else {
            tracing::warn!(
                "No numbered pagination links on page {}; starting there",
                reached
            );
            break;
        };
        if target <= reached {
            tracing::warn!(
                "Pagination stalled at page {} of {}; starting there",
                reached,
                total_pages
            );
            break;
        }

        driver.click(&link).await?;
        settle.settle(&*driver).await;
        tracing::debug!("Jumped to page {}", target);
        reached = target;
    }

    if reached > total_pages {
        tracing::warn!(
            "Reached page {} beyond the advertised {} pages",
            reached,
            total_pages
        );
    }
    Ok(reached.min(total_pages))
}
