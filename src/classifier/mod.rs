pub mod heuristic;

pub use heuristic::HeuristicClassifier;

use crate::browser::{PageCapture, TabHandle};
use crate::error::CrawlError;
use crate::results::ClassificationResult;
use async_trait::async_trait;

/// Inspects a loaded page and decides what it is and where to go next.
///
/// Implementations must never return `PageType::ContentAssumed`; that value
/// is reserved for pages the engine chooses not to classify.
#[async_trait]
pub trait PageClassifier: Send + Sync {
    async fn classify(
        &self,
        tab: TabHandle,
        page: &PageCapture,
        goal: &str,
        depth: u32,
    ) -> Result<ClassificationResult, CrawlError>;
}
