use super::{Browser, PageCapture, TabHandle};
use crate::error::CrawlError;
use crate::results::Viewport;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Common local WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// WebDriver error fragments that mean the session (or the tab) is gone
const LOST_SESSION_MARKERS: [&str; 4] = [
    "unable to find session",
    "invalid session id",
    "disconnected",
    "connection refused",
];

#[derive(Default)]
struct WindowTable {
    next_id: u64,
    windows: HashMap<u64, WindowHandle>,
}

/// [`Browser`] backed by a single WebDriver session, one window per tab
pub struct WebDriverBrowser {
    client: Client,
    // Held for the whole switch-then-act sequence of every tab operation
    table: Mutex<WindowTable>,
}

impl WebDriverBrowser {
    /// Connect to `webdriver_url`, falling back to common local endpoints
    pub async fn connect(webdriver_url: &str) -> Result<Self, CrawlError> {
        match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self::from_client(client));
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS.iter() {
            if *url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self::from_client(client));
            }
        }

        Err(CrawlError::Browser(format!(
            "failed to connect to any WebDriver server (tried {}); \
             make sure one is running or set WEBDRIVER_URL",
            webdriver_url
        )))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            table: Mutex::new(WindowTable::default()),
        }
    }

    async fn switch_to(&self, table: &WindowTable, tab: TabHandle) -> Result<(), CrawlError> {
        let window = table
            .windows
            .get(&tab.id())
            .cloned()
            .ok_or_else(|| CrawlError::Browser(format!("target closed: unknown {}", tab)))?;

        self.client
            .switch_to_window(window)
            .await
            .map_err(|e| browser_error("switching tabs", e))
    }
}

#[async_trait]
impl Browser for WebDriverBrowser {
    async fn open_tab(&self) -> Result<TabHandle, CrawlError> {
        let mut table = self.table.lock().await;
        let response = self
            .client
            .new_window(true)
            .await
            .map_err(|e| browser_error("opening a tab", e))?;

        let tab = TabHandle::new(table.next_id);
        table.next_id += 1;
        table.windows.insert(tab.id(), response.handle);
        ::log::trace!("Opened {}", tab);
        Ok(tab)
    }

    async fn navigate(&self, tab: TabHandle, url: &str) -> Result<(), CrawlError> {
        let table = self.table.lock().await;
        self.switch_to(&table, tab).await?;
        self.client.goto(url).await.map_err(|e| {
            let error = browser_error("navigating", e);
            CrawlError::Navigation {
                url: url.to_string(),
                message: error.to_string(),
            }
        })
    }

    async fn capture(&self, tab: TabHandle) -> Result<PageCapture, CrawlError> {
        let table = self.table.lock().await;
        self.switch_to(&table, tab).await?;

        let url = self
            .client
            .current_url()
            .await
            .map_err(|e| browser_error("reading the URL", e))?;
        let title = self
            .client
            .title()
            .await
            .map_err(|e| browser_error("reading the title", e))?;
        let html = self
            .client
            .source()
            .await
            .map_err(|e| browser_error("getting source", e))?;
        // A missing size is not worth failing the page over
        let (width, height) = self.client.get_window_size().await.unwrap_or((0, 0));

        Ok(PageCapture {
            url: url.as_str().to_string(),
            title,
            html,
            viewport: Viewport { width, height },
        })
    }

    async fn close_tab(&self, tab: TabHandle) -> Result<(), CrawlError> {
        let mut table = self.table.lock().await;
        self.switch_to(&table, tab).await?;
        self.client
            .close_window()
            .await
            .map_err(|e| browser_error("closing a tab", e))?;
        table.windows.remove(&tab.id());
        ::log::trace!("Closed {}", tab);
        Ok(())
    }

    async fn close(&self) -> Result<(), CrawlError> {
        let mut table = self.table.lock().await;
        table.windows.clear();
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| browser_error("closing the session", e))
    }
}

/// Wrap a WebDriver error, tagging lost sessions so they are treated as fatal
fn browser_error(context: &str, error: CmdError) -> CrawlError {
    let message = error.to_string();
    if is_lost_session(&message) {
        ::log::warn!("Lost WebDriver session while {}", context);
        CrawlError::Browser(format!("session closed while {}: {}", context, message))
    } else if message.to_lowercase().contains("no such window") {
        CrawlError::Browser(format!("target closed while {}: {}", context, message))
    } else {
        CrawlError::Browser(format!("{} failed: {}", context, message))
    }
}

fn is_lost_session(message: &str) -> bool {
    let message = message.to_lowercase();
    LOST_SESSION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
