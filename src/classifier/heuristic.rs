use super::PageClassifier;
use crate::browser::{PageCapture, TabHandle};
use crate::config::ScopeConfig;
use crate::error::CrawlError;
use crate::filter::LinkScope;
use crate::parsers::html;
use crate::results::{ClassificationResult, Link, LinkType, PageType};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

const BLOCK_MARKERS: &str =
    r"(?i)\b(captcha|access denied|are you a robot|verify you are human|403 forbidden)\b";

/// Rule-based classifier working purely from the captured HTML
#[derive(Debug)]
pub struct HeuristicClassifier {
    scope: LinkScope,
    block_markers: Regex,
    max_links: usize,
}

impl HeuristicClassifier {
    pub fn new(root_url: &str, config: &ScopeConfig) -> Result<Self, CrawlError> {
        let root = Url::parse(root_url)
            .map_err(|e| CrawlError::Config(format!("invalid start URL {}: {}", root_url, e)))?;
        let scope = LinkScope::new(&root, config)
            .map_err(|e| CrawlError::Config(format!("invalid scope pattern: {}", e)))?;
        let block_markers = Regex::new(BLOCK_MARKERS)
            .map_err(|e| CrawlError::Config(format!("invalid block marker pattern: {}", e)))?;

        Ok(Self {
            scope,
            block_markers,
            max_links: config.max_links_per_page,
        })
    }

    fn outbound_links(&self, page_url: &Url, anchors: &[crate::parsers::Anchor]) -> Vec<Link> {
        let mut seen = HashSet::new();
        seen.insert(page_url.as_str().to_string());

        let mut links = Vec::new();
        for anchor in anchors {
            if links.len() >= self.max_links {
                break;
            }
            let Some(resolved) = self.scope.resolve(page_url, &anchor.href) else {
                continue;
            };
            if !self.scope.allows(&resolved) {
                ::log::trace!("Out of scope: {}", resolved);
                continue;
            }
            if !seen.insert(resolved.as_str().to_string()) {
                continue;
            }

            let link_type = if self.scope.looks_like_content(&resolved) {
                LinkType::Content
            } else {
                LinkType::Entry
            };
            links.push(Link::new(resolved.as_str(), anchor.text.clone(), link_type));
        }
        links
    }
}

#[async_trait]
impl PageClassifier for HeuristicClassifier {
    async fn classify(
        &self,
        _tab: TabHandle,
        page: &PageCapture,
        goal: &str,
        depth: u32,
    ) -> Result<ClassificationResult, CrawlError> {
        let page_url = Url::parse(&page.url).map_err(|e| CrawlError::Classification {
            url: page.url.clone(),
            message: e.to_string(),
        })?;
        let parsed = html::parse(&page.html);
        ::log::debug!("Classifying {} at depth {} for goal {:?}", page.url, depth, goal);

        let title = parsed.title.as_deref().unwrap_or(&page.title);
        if let Some(marker) = self
            .block_markers
            .find(title)
            .or_else(|| self.block_markers.find(&parsed.text))
        {
            return Ok(ClassificationResult::blocked(marker.as_str().to_lowercase()));
        }

        let links = self.outbound_links(&page_url, &parsed.anchors);
        let page_type = if self.scope.looks_like_content(&page_url) {
            PageType::Content
        } else if !links.is_empty() {
            PageType::Entry
        } else {
            PageType::Other
        };

        // Only listing pages lead anywhere
        let next_links = if page_type == PageType::Entry {
            links
        } else {
            Vec::new()
        };

        Ok(ClassificationResult::new(page_type, next_links))
    }
}
