use super::failure::{ConnectionFailureClassifier, FailureClassifier};
use super::lifecycle::PageLifecycle;
use super::state::CrawlState;
use super::throttle::ThrottleGate;
use crate::browser::{Browser, PageCapture, TabHandle};
use crate::classifier::PageClassifier;
use crate::config::CrawlConfig;
use crate::error::{CrawlError, StoreError};
use crate::parsers::html;
use crate::results::{
    ClassificationResult, Link, LinkType, PageMetadata, PageSnapshot, PageType,
};
use crate::store::SnapshotStore;
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::time::timeout;

/// Future returned by the recursive [`CrawlEngine::crawl`]
pub type CrawlFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CrawlError>> + Send + 'a>>;

/// Depth-first, visit-once traversal of the pages reachable from a root.
///
/// Children are explored strictly one at a time in the order the classifier
/// listed them. Each visited page is persisted before any of its children.
pub struct CrawlEngine {
    config: CrawlConfig,
    classifier: Arc<dyn PageClassifier>,
    store: Arc<dyn SnapshotStore>,
    lifecycle: PageLifecycle,
    throttle: ThrottleGate,
    failures: Arc<dyn FailureClassifier>,
}

impl CrawlEngine {
    pub fn new(
        config: CrawlConfig,
        browser: Arc<dyn Browser>,
        classifier: Arc<dyn PageClassifier>,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        let lifecycle = PageLifecycle::new(browser, config.page_close_timeout());
        let throttle = ThrottleGate::new(config.sleep());
        Self {
            config,
            classifier,
            store,
            lifecycle,
            throttle,
            failures: Arc::new(ConnectionFailureClassifier::default()),
        }
    }

    /// Replace the rule deciding which errors abort the crawl
    pub fn with_failure_classifier(mut self, failures: Arc<dyn FailureClassifier>) -> Self {
        self.failures = failures;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn is_fatal(&self, error: &CrawlError) -> bool {
        self.failures.is_fatal(error)
    }

    /// Visit `url` at `depth` and, depth permitting, everything it links to.
    ///
    /// `parent` is a tab the caller already opened for this URL and keeps
    /// ownership of; without one a tab is opened and closed here. `hint` is
    /// the link type predicted by whoever discovered `url`.
    pub fn crawl<'a>(
        &'a self,
        url: &'a str,
        depth: u32,
        state: &'a mut CrawlState,
        parent: Option<TabHandle>,
        hint: Option<LinkType>,
    ) -> CrawlFuture<'a> {
        Box::pin(async move {
            if !state.visited.insert(url) {
                ::log::debug!("Already visited {}", url);
                return Ok(());
            }

            let lease = self.lifecycle.acquire(parent).await?;
            let result = self.process(url, depth, state, lease.handle(), hint).await;
            self.lifecycle.release(lease).await;
            result
        })
    }

    /// Visit `links` in order at `depth`, each in a tab of its own.
    ///
    /// A fatal error or a snapshot index collision stops the loop and is
    /// returned; any other failure only skips the link it came from.
    pub async fn visit_links(
        &self,
        links: &[Link],
        depth: u32,
        state: &mut CrawlState,
    ) -> Result<(), CrawlError> {
        for link in links {
            self.throttle.wait().await;

            let child = match self.lifecycle.acquire(None).await {
                Ok(lease) => lease,
                Err(e) if self.is_fatal(&e) => {
                    ::log::error!("Browser session lost opening a tab for {}: {}", link.url, e);
                    return Err(e);
                }
                Err(e) => {
                    ::log::warn!("Could not open a tab for {}: {}", link.url, e);
                    continue;
                }
            };

            let result = self
                .crawl(
                    &link.url,
                    depth,
                    state,
                    Some(child.handle()),
                    Some(link.link_type),
                )
                .await;

            match result {
                Err(e @ CrawlError::Store(StoreError::IndexTaken(_))) => {
                    // Every later write would collide as well
                    self.lifecycle.release(child).await;
                    ::log::error!("Snapshot index collision while visiting {}: {}", link.url, e);
                    return Err(e);
                }
                Err(e) if self.is_fatal(&e) => {
                    // The session is gone, so the child tab went with it
                    ::log::error!("Browser session lost while visiting {}: {}", link.url, e);
                    return Err(e);
                }
                other => {
                    self.lifecycle.release(child).await;
                    if let Err(e) = other {
                        ::log::warn!("Skipping {}: {}", link.url, e);
                    }
                }
            }
        }
        Ok(())
    }

    async fn process(
        &self,
        url: &str,
        depth: u32,
        state: &mut CrawlState,
        tab: TabHandle,
        hint: Option<LinkType>,
    ) -> Result<(), CrawlError> {
        ::log::info!("Visiting {} (depth {})", url, depth);
        self.navigate(tab, url).await?;
        let capture = self.lifecycle.browser().capture(tab).await?;

        let classification = if self.skips_classification(depth, hint) {
            ::log::debug!("Assuming content for {}", url);
            ClassificationResult::content_assumed()
        } else {
            self.classify(tab, url, &capture, depth).await?
        };

        let snapshot = build_snapshot(url, depth, &capture, classification);
        let index = state
            .pages
            .record(|index| self.store.write(index, &snapshot))?;
        ::log::info!(
            "Saved page #{} {} as {:?} with {} links",
            index,
            url,
            snapshot.classification.page_type,
            snapshot.classification.next_links.len()
        );

        if depth >= self.config.max_depth {
            return Ok(());
        }

        let links = snapshot.classification.next_links;
        self.visit_links(&links, depth + 1, state).await
    }

    /// Pages at the depth limit, or already predicted to be content, are not
    /// worth a classifier call since their links would never be followed
    fn skips_classification(&self, depth: u32, hint: Option<LinkType>) -> bool {
        depth >= self.config.max_depth || hint == Some(LinkType::Content)
    }

    async fn navigate(&self, tab: TabHandle, url: &str) -> Result<(), CrawlError> {
        let limit = self.config.navigation_timeout();
        match timeout(limit, self.lifecycle.browser().navigate(tab, url)).await {
            Ok(result) => result,
            Err(_) => Err(CrawlError::Timeout {
                operation: format!("navigation to {}", url),
                limit,
            }),
        }
    }

    async fn classify(
        &self,
        tab: TabHandle,
        url: &str,
        capture: &PageCapture,
        depth: u32,
    ) -> Result<ClassificationResult, CrawlError> {
        let mut result = self
            .classifier
            .classify(tab, capture, &self.config.goal, depth)
            .await?;

        if result.page_type == PageType::ContentAssumed {
            return Err(CrawlError::Classification {
                url: url.to_string(),
                message: "classifier returned the reserved content-assumed page type".to_string(),
            });
        }
        if result.page_type != PageType::Blocked {
            result.blocked_reason = None;
        }
        Ok(result)
    }
}

fn build_snapshot(
    url: &str,
    depth: u32,
    capture: &PageCapture,
    classification: ClassificationResult,
) -> PageSnapshot {
    let parsed = html::parse(&capture.html);
    let title = if capture.title.is_empty() {
        parsed.title.unwrap_or_default()
    } else {
        capture.title.clone()
    };

    PageSnapshot {
        url: url.to_string(),
        depth,
        timestamp: Utc::now(),
        classification,
        metadata: PageMetadata {
            title,
            viewport: capture.viewport,
        },
        content: Some(parsed.text).filter(|text| !text.is_empty()),
    }
}
