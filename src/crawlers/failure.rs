//! Telling a dead browser session apart from a single bad page.

use crate::error::CrawlError;

/// Message fragments meaning the browser transport or session has died.
///
/// Matched case-insensitively against the error's display text.
pub const FATAL_MARKERS: [&str; 5] = [
    "transport closed",
    "session closed",
    "target closed",
    "connection closed",
    "socket closed",
];

/// Decides whether an error must abort the whole crawl
pub trait FailureClassifier: Send + Sync {
    fn is_fatal(&self, error: &CrawlError) -> bool;
}

/// Treats any error mentioning a closed transport, session, target,
/// connection or socket as fatal; everything else is recoverable
#[derive(Debug, Clone)]
pub struct ConnectionFailureClassifier {
    markers: Vec<String>,
}

impl ConnectionFailureClassifier {
    /// Use a custom marker table instead of [`FATAL_MARKERS`]
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.into().to_lowercase())
                .collect(),
        }
    }

    pub fn is_fatal_message(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.markers.iter().any(|m| message.contains(m.as_str()))
    }
}

impl Default for ConnectionFailureClassifier {
    fn default() -> Self {
        Self::with_markers(FATAL_MARKERS)
    }
}

impl FailureClassifier for ConnectionFailureClassifier {
    fn is_fatal(&self, error: &CrawlError) -> bool {
        self.is_fatal_message(&error.to_string())
    }
}
