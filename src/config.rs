use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings that drive a single crawl session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Free-text objective handed to the page classifier
    #[serde(default)]
    pub goal: String,

    /// Deepest level that is visited (the root is depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Delay before each child-link visit, in milliseconds
    #[serde(default = "default_sleep_ms")]
    pub sleep_ms: u64,

    /// Upper bound on closing one tab
    #[serde(default = "default_page_close_timeout_ms")]
    pub page_close_timeout_ms: u64,

    /// Upper bound on closing the whole browser session
    #[serde(default = "default_session_close_timeout_ms")]
    pub session_close_timeout_ms: u64,

    /// Upper bound on loading one page
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
}

impl CrawlConfig {
    /// Create a configuration with default timeouts
    pub fn new(goal: &str, max_depth: u32, sleep_ms: u64) -> Self {
        Self {
            goal: goal.to_string(),
            max_depth,
            sleep_ms,
            page_close_timeout_ms: default_page_close_timeout_ms(),
            session_close_timeout_ms: default_session_close_timeout_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
        }
    }

    pub fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }

    pub fn page_close_timeout(&self) -> Duration {
        Duration::from_millis(self.page_close_timeout_ms)
    }

    pub fn session_close_timeout(&self) -> Duration {
        Duration::from_millis(self.session_close_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new("", default_max_depth(), default_sleep_ms())
    }
}

/// Which discovered links the heuristic classifier keeps, and how it tags them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Whether links may leave the start page's host
    #[serde(default)]
    pub allow_external: bool,

    /// Regex patterns marking a URL as a content (terminal) page
    #[serde(default = "default_content_patterns")]
    pub content_patterns: Vec<String>,

    /// Regex patterns for URLs that are never followed
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Maximum number of links kept per page
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            allow_external: false,
            content_patterns: default_content_patterns(),
            exclude_patterns: default_exclude_patterns(),
            max_links_per_page: default_max_links_per_page(),
        }
    }
}

/// Full crawler settings, usually loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerSettings {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory under which each fresh crawl gets its own output directory
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub scope: ScopeConfig,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            output_root: default_output_root(),
            crawl: CrawlConfig::default(),
            scope: ScopeConfig::default(),
        }
    }
}

impl CrawlerSettings {
    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrawlError> {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(|e| CrawlError::Config(format!("{}: {}", path.display(), e)))?;

        Self::from_json(&contents)
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, CrawlError> {
        serde_json::from_str(json).map_err(|e| CrawlError::Config(e.to_string()))
    }

    /// Apply the `WEBDRIVER_URL` environment variable if it is set
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_sleep_ms() -> u64 {
    1000
}

fn default_page_close_timeout_ms() -> u64 {
    5_000
}

fn default_session_close_timeout_ms() -> u64 {
    10_000
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_output_root() -> PathBuf {
    PathBuf::from("crawl-output")
}

fn default_content_patterns() -> Vec<String> {
    vec![
        r"/\d{4}/\d{2}/".to_string(),
        r"/(article|articles|post|posts|story|stories|news)/[^/]+".to_string(),
        r"\.html?$".to_string(),
    ]
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$".to_string(),
        r"^(mailto|javascript|tel):".to_string(),
    ]
}

fn default_max_links_per_page() -> usize {
    50
}
