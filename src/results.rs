use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of page a link is predicted to lead to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// A terminal page such as an article
    Content,
    /// A listing page that leads to further pages
    Entry,
}

/// Page type assigned to a visited page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Content,
    Entry,
    Blocked,
    Other,
    /// Written by the crawl engine when it skips classification.
    /// Classifiers must never produce it.
    ContentAssumed,
}

/// An outbound link discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub url: String,
    #[serde(default)]
    pub text: String,
    pub link_type: LinkType,
}

impl Link {
    pub fn new(url: impl Into<String>, text: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            link_type,
        }
    }
}

/// Outcome of classifying one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub page_type: PageType,

    /// Only present when `page_type` is `Blocked`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,

    #[serde(default)]
    pub next_links: Vec<Link>,
}

impl ClassificationResult {
    pub fn new(page_type: PageType, next_links: Vec<Link>) -> Self {
        Self {
            page_type,
            blocked_reason: None,
            next_links,
        }
    }

    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            page_type: PageType::Blocked,
            blocked_reason: Some(reason.into()),
            next_links: Vec::new(),
        }
    }

    /// The result recorded for pages the engine does not classify
    pub fn content_assumed() -> Self {
        Self::new(PageType::ContentAssumed, Vec::new())
    }
}

/// Browser viewport at capture time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u64,
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub viewport: Viewport,
}

/// Durable record of one visited URL, written once and never modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    pub depth: u32,
    pub timestamp: DateTime<Utc>,
    pub classification: ClassificationResult,
    pub metadata: PageMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Record written once per crawl session when it completes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub start_url: String,
    pub goal: String,
    pub max_depth: u32,
    pub total_pages: u64,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_type_wire_names() {
        let json = serde_json::to_string(&PageType::ContentAssumed).unwrap();
        assert_eq!(json, "\"content-assumed\"");

        let parsed: PageType = serde_json::from_str("\"blocked\"").unwrap();
        assert_eq!(parsed, PageType::Blocked);
    }

    #[test]
    fn test_classification_uses_camel_case_keys() {
        let result = ClassificationResult::new(
            PageType::Entry,
            vec![Link::new("https://example.com/a", "A", LinkType::Content)],
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["pageType"], "entry");
        assert_eq!(value["nextLinks"][0]["linkType"], "content");
        // No blocked reason unless the page is blocked
        assert!(value.get("blockedReason").is_none());
    }

    #[test]
    fn test_blocked_result_keeps_reason() {
        let result = ClassificationResult::blocked("captcha");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["blockedReason"], "captcha");
        assert_eq!(value["nextLinks"].as_array().unwrap().len(), 0);
    }
}
