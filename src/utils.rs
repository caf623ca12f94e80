use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

const MAX_FILENAME_CHARS: usize = 80;

/// Convert a URL to a sanitized filename
pub fn sanitize_filename(url: &str) -> String {
    let name = url
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    let name: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_CHARS)
        .collect();

    if name.is_empty() {
        "root".to_string()
    } else {
        name
    }
}

/// Output directory for a fresh crawl of `start_url`, unique per start time
pub fn session_dir(output_root: &Path, start_url: &str, started: DateTime<Utc>) -> PathBuf {
    let host = url::Url::parse(start_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| start_url.to_string());

    output_root.join(format!(
        "{}_{}",
        sanitize_filename(&host),
        started.format("%Y%m%dT%H%M%SZ")
    ))
}

/// Race a close operation against a deadline.
///
/// Returns `true` when the operation completed successfully. Failures and
/// timeouts are logged as warnings and never returned to the caller.
pub async fn close_with_timeout<F, E>(what: &str, limit: Duration, op: F) -> bool
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match timeout(limit, op).await {
        Ok(Ok(())) => {
            ::log::trace!("Closed {}", what);
            true
        }
        Ok(Err(e)) => {
            ::log::warn!("Failed to close {}: {}", what, e);
            false
        }
        Err(_) => {
            ::log::warn!("Gave up closing {} after {:?}", what, limit);
            false
        }
    }
}
