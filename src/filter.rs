use crate::config::ScopeConfig;
use regex::Regex;
use url::Url;

/// Decides which discovered links stay inside the crawl, and what they point at
#[derive(Debug)]
pub struct LinkScope {
    allow_external: bool,
    root_host: Option<String>,
    content_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl LinkScope {
    /// Create a scope anchored on the crawl's start URL
    pub fn new(root_url: &Url, config: &ScopeConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            allow_external: config.allow_external,
            root_host: root_url.host_str().map(|h| h.to_lowercase()),
            content_regexes: compile(&config.content_patterns)?,
            exclude_regexes: compile(&config.exclude_patterns)?,
        })
    }

    /// Whether a resolved URL may be followed
    pub fn allows(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_in_host_scope(url) {
            return false;
        }

        // Exclusions always win
        let url_str = url.as_str();
        !self.exclude_regexes.iter().any(|r| r.is_match(url_str))
    }

    /// Whether a URL looks like a terminal content page
    pub fn looks_like_content(&self, url: &Url) -> bool {
        let url_str = url.as_str();
        self.content_regexes.iter().any(|r| r.is_match(url_str))
    }

    /// Resolve `href` against the page it was found on, dropping any fragment
    pub fn resolve(&self, base: &Url, href: &str) -> Option<Url> {
        let mut resolved = base.join(href).ok()?;
        resolved.set_fragment(None);
        Some(resolved)
    }

    fn is_in_host_scope(&self, url: &Url) -> bool {
        if self.allow_external {
            return true;
        }

        match (&self.root_host, url.host_str()) {
            (Some(root), Some(host)) => {
                let host = host.to_lowercase();
                host == *root || host.ends_with(&format!(".{}", root))
            }
            _ => false,
        }
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}
