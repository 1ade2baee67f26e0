//! Shared configuration and test drivers

use async_trait::async_trait;
use gem_tenders::driver::{NavigationWait, SnapshotDriver, SnapshotElement};
use gem_tenders::service::DriverFactory;
use gem_tenders::{Config, DriverError, DriverResult, PageDriver, Scope};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const BASE_URL: &str = "https://bidplus.gem.gov.in";

/// Creates a test configuration writing into `output_dir`
pub fn create_test_config(output_dir: &Path) -> Config {
    let mut config = Config::with_base_url(BASE_URL);
    config.output.directory = output_dir.display().to_string();
    config
}

/// Snapshot driver whose clicks start failing after a fixed number succeed
pub struct FlakyDriver {
    inner: SnapshotDriver,
    clicks_left: usize,
}

impl FlakyDriver {
    pub fn new(pages: Vec<String>, successful_clicks: usize) -> Self {
        Self {
            inner: SnapshotDriver::new(pages),
            clicks_left: successful_clicks,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[async_trait]
impl PageDriver for FlakyDriver {
    type Element = SnapshotElement;

    async fn navigate(&mut self, url: &str, wait: NavigationWait) -> DriverResult<()> {
        self.inner.navigate(url, wait).await
    }

    async fn query_selector(
        &self,
        scope: Scope<'_, SnapshotElement>,
        selector: &str,
    ) -> DriverResult<Option<SnapshotElement>> {
        self.inner.query_selector(scope, selector).await
    }

    async fn query_selector_all(
        &self,
        scope: Scope<'_, SnapshotElement>,
        selector: &str,
    ) -> DriverResult<Vec<SnapshotElement>> {
        self.inner.query_selector_all(scope, selector).await
    }

    async fn text(&self, element: &SnapshotElement) -> DriverResult<String> {
        self.inner.text(element).await
    }

    async fn attribute(
        &self,
        element: &SnapshotElement,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.inner.attribute(element, name).await
    }

    async fn click(&mut self, element: &SnapshotElement) -> DriverResult<()> {
        if self.clicks_left == 0 {
            return Err(DriverError::Protocol("target crashed".to_string()));
        }
        self.clicks_left -= 1;
        self.inner.click(element).await
    }

    async fn scroll(&mut self, dx: i64, dy: i64) -> DriverResult<()> {
        self.inner.scroll(dx, dy).await
    }

    async fn sleep(&self, _duration: std::time::Duration) {}

    async fn close(&mut self) -> DriverResult<()> {
        self.inner.close().await
    }
}

/// Driver for a listing that cannot be loaded
#[derive(Default)]
pub struct UnreachableDriver {
    pub closed: Arc<AtomicBool>,
}

#[async_trait]
impl PageDriver for UnreachableDriver {
    type Element = SnapshotElement;

    async fn navigate(&mut self, url: &str, _wait: NavigationWait) -> DriverResult<()> {
        Err(DriverError::Navigation {
            url: url.to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        })
    }

    async fn query_selector(
        &self,
        _scope: Scope<'_, SnapshotElement>,
        _selector: &str,
    ) -> DriverResult<Option<SnapshotElement>> {
        Ok(None)
    }

    async fn query_selector_all(
        &self,
        _scope: Scope<'_, SnapshotElement>,
        _selector: &str,
    ) -> DriverResult<Vec<SnapshotElement>> {
        Ok(Vec::new())
    }

    async fn text(&self, _element: &SnapshotElement) -> DriverResult<String> {
        Ok(String::new())
    }

    async fn attribute(
        &self,
        _element: &SnapshotElement,
        _name: &str,
    ) -> DriverResult<Option<String>> {
        Ok(None)
    }

    async fn click(&mut self, _element: &SnapshotElement) -> DriverResult<()> {
        Ok(())
    }

    async fn scroll(&mut self, _dx: i64, _dy: i64) -> DriverResult<()> {
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Factory that holds each run at `open` until released
pub struct GatedFactory {
    pages: Vec<String>,
    gate: Arc<Notify>,
}

impl GatedFactory {
    pub fn new(pages: Vec<String>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                pages,
                gate: Arc::clone(&gate),
            },
            gate,
        )
    }
}

#[async_trait]
impl DriverFactory for GatedFactory {
    type Driver = SnapshotDriver;

    async fn open(&self) -> DriverResult<SnapshotDriver> {
        self.gate.notified().await;
        Ok(SnapshotDriver::new(self.pages.clone()))
    }
}

/// Factory whose browser never starts
pub struct BrokenFactory;

#[async_trait]
impl DriverFactory for BrokenFactory {
    type Driver = SnapshotDriver;

    async fn open(&self) -> DriverResult<SnapshotDriver> {
        Err(DriverError::Launch("chrome binary not found".to_string()))
    }
}
