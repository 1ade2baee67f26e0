use crate::state::Direction;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for gem-tenders
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with defaults for everything but the site origin
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                base_url: base_url.into(),
                listing_path: default_listing_path(),
            },
            traversal: TraversalConfig::default(),
            timing: TimingConfig::default(),
            browser: BrowserConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Origin that detail links are joined onto, without a trailing slash
    pub fn base_origin(&self) -> &str {
        self.site.base_url.trim_end_matches('/')
    }

    /// Absolute URL of the listing root
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_origin(),
            self.site.listing_path.trim_start_matches('/')
        )
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the listing site (e.g. "https://bidplus.gem.gov.in")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated listing, relative to the base URL
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TraversalConfig {
    /// Walk direction: "forward" from page 1, or "backward" from the last page
    #[serde(default)]
    pub direction: Direction,

    /// Lowest page a backward walk extracts
    #[serde(rename = "stop-page", default = "default_stop_page")]
    pub stop_page: u32,

    /// Whether to force newest-first ordering before walking
    #[serde(rename = "apply-sort", default = "default_true")]
    pub apply_sort: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            stop_page: default_stop_page(),
            apply_sort: true,
        }
    }
}

/// Delays and scroll behavior
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Fixed wait after every navigation or pagination click (milliseconds)
    #[serde(rename = "settle-ms", default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Wait after opening the sort dropdown (milliseconds)
    #[serde(rename = "sort-menu-ms", default = "default_sort_menu_ms")]
    pub sort_menu_ms: u64,

    /// Number of scroll steps before extracting a page; 0 disables scrolling
    #[serde(rename = "scroll-steps", default = "default_scroll_steps")]
    pub scroll_steps: u32,

    /// Vertical distance of each scroll step (pixels)
    #[serde(rename = "scroll-distance", default = "default_scroll_distance")]
    pub scroll_distance: i64,

    /// Pause after each scroll step (milliseconds)
    #[serde(rename = "scroll-pause-ms", default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,

    /// Upper bound for the network-idle wait after navigation (milliseconds)
    #[serde(
        rename = "network-idle-timeout-ms",
        default = "default_network_idle_timeout_ms"
    )]
    pub network_idle_timeout_ms: u64,

    /// When set, settle by polling for this selector instead of sleeping
    #[serde(rename = "settle-selector", default)]
    pub settle_selector: Option<String>,
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn sort_menu_delay(&self) -> Duration {
        Duration::from_millis(self.sort_menu_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.network_idle_timeout_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            sort_menu_ms: default_sort_menu_ms(),
            scroll_steps: default_scroll_steps(),
            scroll_distance: default_scroll_distance(),
            scroll_pause_ms: default_scroll_pause_ms(),
            network_idle_timeout_ms: default_network_idle_timeout_ms(),
            settle_selector: None,
        }
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome/Chromium binary; auto-detected when absent
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Extra command-line flags passed to the browser
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            args: default_browser_args(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives result artifacts
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// File name of the CSV artifact inside `directory`; derived from the
    /// walk direction and page span when absent
    #[serde(rename = "csv-name", default)]
    pub csv_name: Option<String>,

    /// Optional SQLite database recording every run and its records
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            csv_name: None,
            database_path: None,
        }
    }
}

fn default_listing_path() -> String {
    "/all-bids".to_string()
}

fn default_stop_page() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_sort_menu_ms() -> u64 {
    1000
}

fn default_scroll_steps() -> u32 {
    5
}

fn default_scroll_distance() -> i64 {
    3000
}

fn default_scroll_pause_ms() -> u64 {
    300
}

fn default_network_idle_timeout_ms() -> u64 {
    30_000
}

fn default_browser_args() -> Vec<String> {
    vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-software-rasterizer".to_string(),
    ]
}

fn default_output_directory() -> String {
    "./output".to_string()
}

