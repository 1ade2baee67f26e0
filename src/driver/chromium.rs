//! Chrome/Chromium page driver
//!
//! This module launches one browser session over the DevTools protocol and
//! exposes it through the [`PageDriver`] trait.

use crate::config::{BrowserConfig, TimingConfig};
use crate::driver::{DriverFactory, NavigationWait, PageDriver, Scope};
use crate::{DriverError, DriverResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Resource-count polling used to approximate "network idle"
const NETWORK_IDLE_QUIET_MS: u64 = 500;
const NETWORK_IDLE_POLL_MS: u64 = 250;

/// A live browser session with a single page
pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    network_idle_timeout: Duration,
    closed: bool,
}

impl ChromiumDriver {
    /// Launches a browser and opens a blank page
    ///
    /// # Arguments
    ///
    /// * `config` - Browser flags, binary and headless choice
    /// * `network_idle_timeout` - Upper bound for [`NavigationWait::NetworkIdle`]
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumDriver)` - The session is ready for navigation
    /// * `Err(DriverError)` - The browser could not be started
    pub async fn launch(
        config: &BrowserConfig,
        network_idle_timeout: Duration,
    ) -> DriverResult<Self> {
        let mut builder = CdpBrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        for arg in &config.args {
            builder = builder.arg(arg.as_str());
        }
        let browser_config = builder.build().map_err(DriverError::Launch)?;

        tracing::info!(
            "Launching browser (headless: {}, {} extra args)",
            config.headless,
            config.args.len()
        );
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Protocol(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler,
            network_idle_timeout,
            closed: false,
        })
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    /// Polls the resource timeline until it stops growing for a quiet window
    async fn wait_for_network_idle(&self) {
        let timeout_ms = self.network_idle_timeout.as_millis() as u64;
        let js = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const quietMs = {quiet_ms};
                const interval = {poll_ms};
                const start = Date.now();
                let lastCount = performance.getEntriesByType('resource').length;
                let stableMs = 0;
                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const count = performance.getEntriesByType('resource').length;
                    if (document.readyState === 'complete' && count === lastCount) {{
                        stableMs += interval;
                        if (stableMs >= quietMs) return true;
                    }} else {{
                        stableMs = 0;
                    }}
                    lastCount = count;
                }}
                return false;
            }})()"#,
            timeout_ms = timeout_ms,
            quiet_ms = NETWORK_IDLE_QUIET_MS,
            poll_ms = NETWORK_IDLE_POLL_MS,
        );

        match self.page.evaluate(js).await {
            Ok(result) => match result.into_value::<bool>() {
                Ok(true) => tracing::debug!("Network idle reached"),
                _ => tracing::warn!(
                    "Network did not go idle within {:?}; continuing",
                    self.network_idle_timeout
                ),
            },
            Err(e) => tracing::warn!("Network idle check failed: {}", e),
        }
    }
}

fn protocol(e: chromiumoxide::error::CdpError) -> DriverError {
    DriverError::Protocol(e.to_string())
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    type Element = Element;

    async fn navigate(&mut self, url: &str, wait: NavigationWait) -> DriverResult<()> {
        self.ensure_open()?;
        tracing::debug!("Navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if wait == NavigationWait::NetworkIdle {
            self.wait_for_network_idle().await;
        }
        Ok(())
    }

    async fn query_selector(
        &self,
        scope: Scope<'_, Element>,
        selector: &str,
    ) -> DriverResult<Option<Element>> {
        // find_elements reports "no match" as an empty list, unlike find_element
        Ok(self
            .query_selector_all(scope, selector)
            .await?
            .into_iter()
            .next())
    }

    async fn query_selector_all(
        &self,
        scope: Scope<'_, Element>,
        selector: &str,
    ) -> DriverResult<Vec<Element>> {
        self.ensure_open()?;
        match scope {
            Scope::Document => self.page.find_elements(selector).await.map_err(protocol),
            Scope::Within(element) => element.find_elements(selector).await.map_err(protocol),
        }
    }

    async fn text(&self, element: &Element) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(element.inner_text().await.map_err(protocol)?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> DriverResult<Option<String>> {
        self.ensure_open()?;
        element.attribute(name).await.map_err(protocol)
    }

    async fn click(&mut self, element: &Element) -> DriverResult<()> {
        self.ensure_open()?;
        element.click().await.map_err(protocol)?;
        Ok(())
    }

    async fn scroll(&mut self, dx: i64, dy: i64) -> DriverResult<()> {
        self.ensure_open()?;
        self.page
            .evaluate(format!("window.scrollBy({}, {})", dx, dy))
            .await
            .map_err(protocol)?;
        Ok(())
    }

    async fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await.map_err(protocol);
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed waiting for browser exit: {}", e);
        }
        self.handler.abort();
        tracing::info!("Browser session closed");
        result.map(|_| ())
    }
}

/// Opens a fresh [`ChromiumDriver`] for every run
#[derive(Debug, Clone)]
pub struct ChromiumFactory {
    browser: BrowserConfig,
    network_idle_timeout: Duration,
}

impl ChromiumFactory {
    pub fn new(browser: BrowserConfig, timing: &TimingConfig) -> Self {
        Self {
            browser,
            network_idle_timeout: timing.network_idle_timeout(),
        }
    }
}

#[async_trait]
impl DriverFactory for ChromiumFactory {
    type Driver = ChromiumDriver;

    async fn open(&self) -> DriverResult<ChromiumDriver> {
        ChromiumDriver::launch(&self.browser, self.network_idle_timeout).await
    }
}
