use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while crawling or resuming a crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The browsing session or one of its tabs reported a failure
    #[error("browser error: {0}")]
    Browser(String),

    /// Navigating a tab to a URL failed
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// An operation did not finish within its deadline
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: String,
        limit: Duration,
    },

    /// The page classifier failed or returned an unusable result
    #[error("classification of {url} failed: {message}")]
    Classification { url: String, message: String },

    /// Reading or writing snapshots failed
    #[error("snapshot store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The output directory holds nothing a crawl can be resumed from
    #[error("cannot resume from {}: no root snapshot found", .0.display())]
    ResumeUnavailable(PathBuf),
}

/// Errors raised by a snapshot store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot with this index has already been written
    #[error("snapshot index {0} is already taken")]
    IndexTaken(u64),
}
