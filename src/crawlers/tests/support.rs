//! In-memory browser and classifier doubles for traversal tests.

use crate::browser::{Browser, PageCapture, TabHandle};
use crate::classifier::PageClassifier;
use crate::config::CrawlConfig;
use crate::crawlers::CrawlEngine;
use crate::error::CrawlError;
use crate::results::{ClassificationResult, Link, LinkType, PageType, Viewport};
use crate::store::{FsSnapshotStore, SnapshotStore, StoredSnapshot};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROOT: &str = "https://example.com/";

pub fn url(path: &str) -> String {
    format!("https://example.com/{}", path)
}

pub fn link(path: &str, link_type: LinkType) -> Link {
    Link::new(url(path), path, link_type)
}

pub fn entry_page(links: Vec<Link>) -> ClassificationResult {
    ClassificationResult::new(PageType::Entry, links)
}

/// Crawl settings with no throttling and a short tab-close timeout
pub fn config(max_depth: u32) -> CrawlConfig {
    let mut config = CrawlConfig::new("find articles", max_depth, 0);
    config.page_close_timeout_ms = 50;
    config
}

pub fn engine(
    config: CrawlConfig,
    browser: &Arc<MockBrowser>,
    classifier: &Arc<ScriptedClassifier>,
    store: &Arc<FsSnapshotStore>,
) -> CrawlEngine {
    CrawlEngine::new(config, browser.clone(), classifier.clone(), store.clone())
}

pub fn stored(store: &FsSnapshotStore) -> Vec<StoredSnapshot> {
    store.read_all().unwrap().unwrap_or_default()
}

pub fn stored_urls(store: &FsSnapshotStore) -> Vec<String> {
    stored(store).into_iter().map(|s| s.snapshot.url).collect()
}

#[derive(Default)]
struct BrowserState {
    next_id: u64,
    open: HashSet<u64>,
    opened: usize,
    closed: Vec<u64>,
    navigations: Vec<String>,
    locations: HashMap<u64, String>,
    session_closed: bool,
}

/// Browser double that records every tab operation
#[derive(Default)]
pub struct MockBrowser {
    state: Mutex<BrowserState>,
    navigation_failures: HashMap<String, String>,
    open_failure: Option<String>,
    hang_on_close: bool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make navigating to `url` fail with `message`
    pub fn failing_on(mut self, url: &str, message: &str) -> Self {
        self.navigation_failures
            .insert(url.to_string(), message.to_string());
        self
    }

    /// Make every attempt to open a tab fail with `message`
    pub fn failing_to_open(mut self, message: &str) -> Self {
        self.open_failure = Some(message.to_string());
        self
    }

    /// Make closing tabs never finish
    pub fn hanging_on_close(mut self) -> Self {
        self.hang_on_close = true;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> Vec<u64> {
        self.state.lock().unwrap().closed.clone()
    }

    pub fn open_tabs(&self) -> usize {
        self.state.lock().unwrap().open.len()
    }

    pub fn session_closed(&self) -> bool {
        self.state.lock().unwrap().session_closed
    }
}

#[async_trait]
impl Browser for MockBrowser {
    async fn open_tab(&self) -> Result<TabHandle, CrawlError> {
        if let Some(message) = &self.open_failure {
            return Err(CrawlError::Browser(message.clone()));
        }
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.opened += 1;
        state.open.insert(id);
        Ok(TabHandle::new(id))
    }

    async fn navigate(&self, tab: TabHandle, url: &str) -> Result<(), CrawlError> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if let Some(message) = self.navigation_failures.get(url) {
            return Err(CrawlError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            });
        }
        state.locations.insert(tab.id(), url.to_string());
        Ok(())
    }

    async fn capture(&self, tab: TabHandle) -> Result<PageCapture, CrawlError> {
        let state = self.state.lock().unwrap();
        let url = state
            .locations
            .get(&tab.id())
            .cloned()
            .ok_or_else(|| CrawlError::Browser(format!("{} never navigated", tab)))?;
        Ok(PageCapture {
            title: format!("Title of {}", url),
            html: format!("<html><body><p>Body of {}</p></body></html>", url),
            url,
            viewport: Viewport {
                width: 1280,
                height: 720,
            },
        })
    }

    async fn close_tab(&self, tab: TabHandle) -> Result<(), CrawlError> {
        if self.hang_on_close {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        let mut state = self.state.lock().unwrap();
        if !state.open.remove(&tab.id()) {
            return Err(CrawlError::Browser(format!("{} is not open", tab)));
        }
        state.closed.push(tab.id());
        Ok(())
    }

    async fn close(&self) -> Result<(), CrawlError> {
        self.state.lock().unwrap().session_closed = true;
        Ok(())
    }
}

/// Classifier double answering from a URL-keyed script
#[derive(Default)]
pub struct ScriptedClassifier {
    answers: HashMap<String, Result<ClassificationResult, String>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, url: &str, result: ClassificationResult) -> Self {
        self.answers.insert(url.to_string(), Ok(result));
        self
    }

    pub fn fail(mut self, url: &str, message: &str) -> Self {
        self.answers
            .insert(url.to_string(), Err(message.to_string()));
        self
    }

    /// URLs classified so far, with the depth they were classified at
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageClassifier for ScriptedClassifier {
    async fn classify(
        &self,
        _tab: TabHandle,
        page: &PageCapture,
        _goal: &str,
        depth: u32,
    ) -> Result<ClassificationResult, CrawlError> {
        self.calls.lock().unwrap().push((page.url.clone(), depth));
        match self.answers.get(&page.url) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(message)) => Err(CrawlError::Classification {
                url: page.url.clone(),
                message: message.clone(),
            }),
            None => Ok(ClassificationResult::new(PageType::Other, Vec::new())),
        }
    }
}
