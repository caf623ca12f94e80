pub mod webdriver;

pub use webdriver::WebDriverBrowser;

use crate::error::CrawlError;
use crate::results::Viewport;
use async_trait::async_trait;
use std::fmt;

/// Opaque identifier of one open tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabHandle(u64);

impl TabHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// State of a loaded page, as seen by the classifier and the snapshot
#[derive(Debug, Clone, Default)]
pub struct PageCapture {
    /// URL the tab ended up on
    pub url: String,
    pub title: String,
    pub html: String,
    pub viewport: Viewport,
}

/// A browsing session able to hold several tabs open at once
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a new, empty tab
    async fn open_tab(&self) -> Result<TabHandle, CrawlError>;

    /// Load `url` in the given tab
    async fn navigate(&self, tab: TabHandle, url: &str) -> Result<(), CrawlError>;

    /// Read the current state of the given tab
    async fn capture(&self, tab: TabHandle) -> Result<PageCapture, CrawlError>;

    async fn close_tab(&self, tab: TabHandle) -> Result<(), CrawlError>;

    /// End the whole session
    async fn close(&self) -> Result<(), CrawlError>;
}
