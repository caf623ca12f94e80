//! Goal-directed, resumable web crawling.
//!
//! A crawl starts at one page, asks a [`PageClassifier`] what each page is and
//! which of its links are worth following, and walks those links depth-first
//! up to a depth limit. Every visited page is written to a [`SnapshotStore`]
//! as it is processed, so an interrupted crawl can be resumed from its output
//! directory alone.

pub mod browser;
pub mod classifier;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod store;
pub mod utils;

pub use browser::{Browser, PageCapture, TabHandle, WebDriverBrowser};
pub use classifier::{HeuristicClassifier, PageClassifier};
pub use config::{CrawlConfig, CrawlerSettings};
pub use crawlers::{CrawlEngine, close_session};
pub use error::{CrawlError, StoreError};
pub use results::{ClassificationResult, CrawlSummary, Link, LinkType, PageSnapshot, PageType};
pub use store::{FsSnapshotStore, SnapshotStore};

use chrono::Utc;
use crawlers::{CrawlState, FailureClassifier, ResumeStateBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// How a crawl session ended without error
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    /// The traversal ran and its summary was written
    Completed(CrawlSummary),
    /// A resume was requested but every first-level link was already visited
    AlreadyComplete { output_dir: PathBuf },
}

#[derive(Debug, Clone)]
enum Mode {
    Fresh { start_url: String },
    Resume,
}

/// One crawl session, either fresh or resumed from an output directory
pub struct Crawl {
    mode: Mode,
    output_dir: PathBuf,
    config: CrawlConfig,
    failures: Option<Arc<dyn FailureClassifier>>,
}

impl Crawl {
    /// Crawl from `start_url`, writing snapshots into `output_dir`
    pub fn fresh(start_url: &str, output_dir: impl Into<PathBuf>, config: CrawlConfig) -> Self {
        Self {
            mode: Mode::Fresh {
                start_url: start_url.to_string(),
            },
            output_dir: output_dir.into(),
            config,
            failures: None,
        }
    }

    /// Continue the crawl whose snapshots are in `output_dir`
    pub fn resume(output_dir: impl Into<PathBuf>, config: CrawlConfig) -> Self {
        Self {
            mode: Mode::Resume,
            output_dir: output_dir.into(),
            config,
            failures: None,
        }
    }

    /// Replace the rule deciding which errors abort the crawl
    pub fn with_failure_classifier(mut self, failures: Arc<dyn FailureClassifier>) -> Self {
        self.failures = Some(failures);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_resume(&self) -> bool {
        matches!(self.mode, Mode::Resume)
    }

    /// Run with the filesystem store in the output directory
    pub async fn run(
        self,
        browser: Arc<dyn Browser>,
        classifier: Arc<dyn PageClassifier>,
    ) -> Result<CrawlOutcome, CrawlError> {
        let store = Arc::new(FsSnapshotStore::new(&self.output_dir));
        self.run_with_store(browser, classifier, store).await
    }

    pub async fn run_with_store(
        self,
        browser: Arc<dyn Browser>,
        classifier: Arc<dyn PageClassifier>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<CrawlOutcome, CrawlError> {
        let started = Instant::now();

        // Work out where to start before touching the browser
        let (start_url, links, mut state) = match &self.mode {
            Mode::Fresh { start_url } => (start_url.clone(), None, CrawlState::new()),
            Mode::Resume => {
                let resumed = ResumeStateBuilder::new(store.as_ref())
                    .build()?
                    .ok_or_else(|| CrawlError::ResumeUnavailable(self.output_dir.clone()))?;
                if resumed.is_complete() {
                    ::log::info!(
                        "Nothing left to crawl in {}; all first-level links were visited",
                        self.output_dir.display()
                    );
                    return Ok(CrawlOutcome::AlreadyComplete {
                        output_dir: self.output_dir,
                    });
                }
                let start_url = resumed.start_url.clone();
                let (links, state) = resumed.into_parts();
                (start_url, Some(links), state)
            }
        };

        let mut engine = CrawlEngine::new(self.config.clone(), browser, classifier, store.clone());
        if let Some(failures) = self.failures.clone() {
            engine = engine.with_failure_classifier(failures);
        }

        match &links {
            None => {
                ::log::info!(
                    "Starting crawl of {} (max depth {}, goal {:?})",
                    start_url,
                    self.config.max_depth,
                    self.config.goal
                );
                engine.crawl(&start_url, 0, &mut state, None, None).await?;
            }
            Some(links) => {
                ::log::info!(
                    "Resuming crawl of {} with {} remaining links",
                    start_url,
                    links.len()
                );
                engine.visit_links(links, 1, &mut state).await?;
            }
        }

        let summary = CrawlSummary {
            start_url,
            goal: self.config.goal.clone(),
            max_depth: self.config.max_depth,
            total_pages: state.pages.current(),
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
            resumed: links.is_some().then_some(true),
        };
        store.write_summary(&summary)?;
        ::log::info!(
            "Crawl complete: {} pages in {} ms",
            summary.total_pages,
            summary.duration_ms
        );

        Ok(CrawlOutcome::Completed(summary))
    }
}
