use crate::error::StoreError;
use std::collections::HashSet;

/// URLs already processed in this session. URLs are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`, returning `false` if it was already present
    pub fn insert(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl FromIterator<String> for VisitedSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

/// Next free snapshot index. Only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageIndexCounter {
    next: u64,
}

impl PageIndexCounter {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn current(&self) -> u64 {
        self.next
    }

    /// Run `write` with the current index and advance only if it succeeds
    pub fn record<F>(&mut self, write: F) -> Result<u64, StoreError>
    where
        F: FnOnce(u64) -> Result<(), StoreError>,
    {
        let index = self.next;
        write(index)?;
        self.next += 1;
        Ok(index)
    }
}

/// Mutable traversal state owned by one top-level crawl invocation
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    pub visited: VisitedSet,
    pub pages: PageIndexCounter,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visited_insert_is_at_most_once() {
        let mut visited = VisitedSet::new();
        assert!(visited.insert("https://example.com/"));
        assert!(!visited.insert("https://example.com/"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_counter_advances_only_on_success() {
        let mut counter = PageIndexCounter::starting_at(3);

        assert_eq!(counter.record(|_| Ok(())).unwrap(), 3);
        assert!(counter.record(|i| Err(StoreError::IndexTaken(i))).is_err());
        assert_eq!(counter.current(), 4);
        assert_eq!(counter.record(|_| Ok(())).unwrap(), 4);
    }
}
