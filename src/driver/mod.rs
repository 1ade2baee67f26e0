//! Page driver capability interface
//!
//! The traversal engine never talks to a browser directly. It consumes the
//! narrow [`PageDriver`] trait below, which two backends implement:
//!
//! - [`ChromiumDriver`]: a live Chrome/Chromium session over the DevTools protocol
//! - [`SnapshotDriver`]: replays saved listing pages, interpreting clicks on
//!   the pagination and sort controls

mod chromium;
#[cfg(test)]
pub(crate) mod fixtures;
mod snapshot;

pub use chromium::{ChromiumDriver, ChromiumFactory};
pub use snapshot::{SnapshotDriver, SnapshotElement, SnapshotFactory};

use crate::DriverResult;
use async_trait::async_trait;
use std::time::Duration;

/// How long a navigation waits before returning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationWait {
    /// Return once the load event has fired
    Load,
    /// Additionally wait until network activity has quiesced
    NetworkIdle,
}

/// Where a selector query is evaluated
#[derive(Debug)]
pub enum Scope<'a, E> {
    /// The whole current document
    Document,
    /// Descendants of a previously returned element
    Within(&'a E),
}

impl<E> Clone for Scope<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Scope<'_, E> {}

/// A controllable browser document session
///
/// Every query may come back empty. Callers are expected to degrade (empty
/// strings, default counts, early termination) instead of treating absence as
/// an error.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Handle to an element of the current document
    type Element: Send + Sync;

    /// Loads `url` in the session
    async fn navigate(&mut self, url: &str, wait: NavigationWait) -> DriverResult<()>;

    /// Returns the first element matching `selector`, if any
    async fn query_selector(
        &self,
        scope: Scope<'_, Self::Element>,
        selector: &str,
    ) -> DriverResult<Option<Self::Element>>;

    /// Returns every element matching `selector`, in document order
    async fn query_selector_all(
        &self,
        scope: Scope<'_, Self::Element>,
        selector: &str,
    ) -> DriverResult<Vec<Self::Element>>;

    /// Rendered text of an element (untrimmed)
    async fn text(&self, element: &Self::Element) -> DriverResult<String>;

    /// Value of an attribute, or `None` when the attribute is missing
    async fn attribute(&self, element: &Self::Element, name: &str) -> DriverResult<Option<String>>;

    async fn click(&mut self, element: &Self::Element) -> DriverResult<()>;

    /// Scrolls the viewport by `(dx, dy)` pixels
    async fn scroll(&mut self, dx: i64, dy: i64) -> DriverResult<()>;

    /// Suspends the caller for `duration`
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    /// Ends the session; further calls fail with [`crate::DriverError::Closed`]
    async fn close(&mut self) -> DriverResult<()>;
}

/// Opens a fresh driver session for each run
#[async_trait]
pub trait DriverFactory: Send + Sync + 'static {
    type Driver: PageDriver + 'static;

    async fn open(&self) -> DriverResult<Self::Driver>;
}
