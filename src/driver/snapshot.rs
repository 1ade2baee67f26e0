//! Snapshot replay driver
//!
//! Replays a sequence of saved listing pages (`page-1.html`, `page-2.html`, …)
//! as if they were a live session. Clicks on the pagination and sort controls
//! move between snapshots the way the real listing moves between pages, which
//! makes selector drift reproducible offline.

use crate::driver::{DriverFactory, NavigationWait, PageDriver, Scope};
use crate::{DriverError, DriverResult};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Element handle for the snapshot driver: the element's outer HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotElement {
    html: String,
}

impl SnapshotElement {
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// What clicking an element does to the replayed session
#[derive(Debug, Clone, PartialEq, Eq)]
enum ClickAction {
    OpenSortMenu,
    SelectNewestFirst,
    Next,
    Previous,
    GoTo(usize),
    Inert,
}

/// Replays pre-rendered listing pages
#[derive(Debug, Clone)]
pub struct SnapshotDriver {
    pages: Vec<String>,
    current: usize,
    sort_menu_open: bool,
    sorted: bool,
    navigations: Vec<String>,
    clicks: Vec<String>,
    scrolls: u32,
    closed: bool,
}

impl SnapshotDriver {
    /// Creates a driver over in-memory pages; `pages[0]` is page 1
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            current: 1,
            sort_menu_open: false,
            sorted: false,
            navigations: Vec::new(),
            clicks: Vec::new(),
            scrolls: 0,
            closed: false,
        }
    }

    /// Loads `page-1.html`, `page-2.html`, … from `dir` until one is missing
    ///
    /// # Returns
    ///
    /// * `Ok(SnapshotDriver)` - At least one page was found
    /// * `Err(DriverError)` - The directory holds no `page-1.html` or a page
    ///   could not be read
    pub fn from_dir(dir: &Path) -> DriverResult<Self> {
        let mut pages = Vec::new();
        loop {
            let path = dir.join(format!("page-{}.html", pages.len() + 1));
            if !path.exists() {
                break;
            }
            let html = std::fs::read_to_string(&path).map_err(|e| {
                DriverError::Snapshot(format!("Failed to read {}: {}", path.display(), e))
            })?;
            pages.push(html);
        }

        if pages.is_empty() {
            return Err(DriverError::Snapshot(format!(
                "No page-1.html found in {}",
                dir.display()
            )));
        }

        tracing::info!("Loaded {} snapshot pages from {}", pages.len(), dir.display());
        Ok(Self::new(pages))
    }

    /// Page number currently shown
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether "newest first" ordering was selected through the sort menu
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// Trimmed text of every clicked element, in click order
    pub fn clicks(&self) -> &[String] {
        &self.clicks
    }

    pub fn scroll_count(&self) -> u32 {
        self.scrolls
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    fn current_html(&self) -> DriverResult<&str> {
        self.pages
            .get(self.current - 1)
            .map(String::as_str)
            .ok_or_else(|| DriverError::Snapshot(format!("No snapshot for page {}", self.current)))
    }

    fn apply(&mut self, action: ClickAction) {
        match action {
            ClickAction::OpenSortMenu => self.sort_menu_open = true,
            ClickAction::SelectNewestFirst => {
                if self.sort_menu_open {
                    self.sorted = true;
                    self.sort_menu_open = false;
                    self.current = 1;
                }
            }
            ClickAction::Next => {
                if self.current < self.pages.len() {
                    self.current += 1;
                }
            }
            ClickAction::Previous => {
                if self.current > 1 {
                    self.current -= 1;
                }
            }
            ClickAction::GoTo(page) => {
                if (1..=self.pages.len()).contains(&page) {
                    self.current = page;
                }
            }
            ClickAction::Inert => {}
        }
    }
}

fn parse_selector(selector: &str) -> DriverResult<Selector> {
    Selector::parse(selector).map_err(|e| DriverError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Outer HTML of every element in `html` matching `selector`
fn select_all(html: &str, fragment: bool, selector: &str) -> DriverResult<Vec<SnapshotElement>> {
    let selector = parse_selector(selector)?;
    let document = if fragment {
        Html::parse_fragment(html)
    } else {
        Html::parse_document(html)
    };

    let matches = match fragment.then(|| root_element(&document)).flatten() {
        // Within an element only its descendants are candidates
        Some(root) => root
            .select(&selector)
            .filter(|el| el.id() != root.id())
            .map(|el| SnapshotElement { html: el.html() })
            .collect(),
        None => document
            .select(&selector)
            .map(|el| SnapshotElement { html: el.html() })
            .collect(),
    };
    Ok(matches)
}

/// The element a fragment was built from
fn root_element(fragment: &Html) -> Option<ElementRef<'_>> {
    fragment
        .root_element()
        .children()
        .find_map(ElementRef::wrap)
}

fn element_text(element: &SnapshotElement) -> String {
    let fragment = Html::parse_fragment(&element.html);
    root_element(&fragment)
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default()
}

fn element_attribute(element: &SnapshotElement, name: &str) -> Option<String> {
    let fragment = Html::parse_fragment(&element.html);
    root_element(&fragment).and_then(|el| el.value().attr(name).map(str::to_string))
}

fn classify_click(element: &SnapshotElement) -> ClickAction {
    let fragment = Html::parse_fragment(&element.html);
    let Some(el) = root_element(&fragment) else {
        return ClickAction::Inert;
    };
    let value = el.value();
    let has_class = |class: &str| value.classes().any(|c| c == class);

    match value.id() {
        Some("currentSort") => return ClickAction::OpenSortMenu,
        Some("Bid-Start-Date-Latest") => return ClickAction::SelectNewestFirst,
        _ => {}
    }

    if has_class("next") {
        ClickAction::Next
    } else if has_class("prev") {
        ClickAction::Previous
    } else if has_class("page-link") {
        el.text()
            .collect::<String>()
            .trim()
            .parse::<usize>()
            .map(ClickAction::GoTo)
            .unwrap_or(ClickAction::Inert)
    } else {
        ClickAction::Inert
    }
}

#[async_trait]
impl PageDriver for SnapshotDriver {
    type Element = SnapshotElement;

    async fn navigate(&mut self, url: &str, _wait: NavigationWait) -> DriverResult<()> {
        self.ensure_open()?;
        self.navigations.push(url.to_string());
        self.current = 1;
        self.sort_menu_open = false;
        Ok(())
    }

    async fn query_selector(
        &self,
        scope: Scope<'_, SnapshotElement>,
        selector: &str,
    ) -> DriverResult<Option<SnapshotElement>> {
        Ok(self
            .query_selector_all(scope, selector)
            .await?
            .into_iter()
            .next())
    }

    async fn query_selector_all(
        &self,
        scope: Scope<'_, SnapshotElement>,
        selector: &str,
    ) -> DriverResult<Vec<SnapshotElement>> {
        self.ensure_open()?;
        match scope {
            Scope::Document => select_all(self.current_html()?, false, selector),
            Scope::Within(element) => select_all(&element.html, true, selector),
        }
    }

    async fn text(&self, element: &SnapshotElement) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(element_text(element))
    }

    async fn attribute(
        &self,
        element: &SnapshotElement,
        name: &str,
    ) -> DriverResult<Option<String>> {
        self.ensure_open()?;
        Ok(element_attribute(element, name))
    }

    async fn click(&mut self, element: &SnapshotElement) -> DriverResult<()> {
        self.ensure_open()?;
        let action = classify_click(element);
        tracing::trace!("Snapshot click {:?} on page {}", action, self.current);
        self.clicks.push(element_text(element).trim().to_string());
        self.apply(action);
        Ok(())
    }

    async fn scroll(&mut self, _dx: i64, _dy: i64) -> DriverResult<()> {
        self.ensure_open()?;
        self.scrolls += 1;
        Ok(())
    }

    // Saved pages are already fully rendered
    async fn sleep(&self, _duration: Duration) {}

    async fn close(&mut self) -> DriverResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Where a [`SnapshotFactory`] takes its pages from
#[derive(Debug, Clone)]
enum SnapshotSource {
    Pages(Vec<String>),
    Directory(PathBuf),
}

/// Opens a fresh [`SnapshotDriver`] for every run
#[derive(Debug, Clone)]
pub struct SnapshotFactory {
    source: SnapshotSource,
}

impl SnapshotFactory {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            source: SnapshotSource::Pages(pages),
        }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: SnapshotSource::Directory(dir.into()),
        }
    }
}

#[async_trait]
impl DriverFactory for SnapshotFactory {
    type Driver = SnapshotDriver;

    async fn open(&self) -> DriverResult<SnapshotDriver> {
        match &self.source {
            SnapshotSource::Pages(pages) => Ok(SnapshotDriver::new(pages.clone())),
            SnapshotSource::Directory(dir) => SnapshotDriver::from_dir(dir),
        }
    }
}
