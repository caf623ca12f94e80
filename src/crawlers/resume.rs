use super::state::{CrawlState, PageIndexCounter, VisitedSet};
use crate::error::StoreError;
use crate::results::Link;
use crate::store::{FsSnapshotStore, SnapshotStore};
use std::collections::HashSet;
use std::path::Path;

/// Traversal state recovered from the snapshots of an interrupted crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeState {
    /// URL of the root page (snapshot 0)
    pub start_url: String,
    /// First-level links not visited yet, in the root's original order
    pub remaining_links: Vec<Link>,
    pub visited_urls: VisitedSet,
    pub next_page_index: u64,
}

impl ResumeState {
    /// Nothing left to visit
    pub fn is_complete(&self) -> bool {
        self.remaining_links.is_empty()
    }

    /// Split into the links to revisit and the state to continue with
    pub fn into_parts(self) -> (Vec<Link>, CrawlState) {
        let state = CrawlState {
            visited: self.visited_urls,
            pages: PageIndexCounter::starting_at(self.next_page_index),
        };
        (self.remaining_links, state)
    }
}

/// Rebuilds [`ResumeState`] purely from what a store already holds.
///
/// Only the root's own links are ever resumed; pages deeper than the first
/// level that were never reached are not recovered.
pub struct ResumeStateBuilder<'a> {
    store: &'a dyn SnapshotStore,
}

impl<'a> ResumeStateBuilder<'a> {
    pub fn new(store: &'a dyn SnapshotStore) -> Self {
        Self { store }
    }

    /// `None` when there is no snapshot directory or no root snapshot
    pub fn build(&self) -> Result<Option<ResumeState>, StoreError> {
        let Some(snapshots) = self.store.read_all()? else {
            ::log::debug!("No snapshot directory to resume from");
            return Ok(None);
        };
        let Some(root) = snapshots.iter().find(|s| s.index == 0) else {
            ::log::debug!("No root snapshot among {} snapshots", snapshots.len());
            return Ok(None);
        };

        let visited_urls: VisitedSet = snapshots.iter().map(|s| s.snapshot.url.clone()).collect();

        let mut queued = HashSet::new();
        let remaining_links: Vec<Link> = root
            .snapshot
            .classification
            .next_links
            .iter()
            .filter(|link| !visited_urls.contains(&link.url))
            .filter(|link| queued.insert(link.url.clone()))
            .cloned()
            .collect();

        // Unreadable snapshot files still occupy their index
        let readable = snapshots.len() as u64;
        let next_page_index = self
            .store
            .persisted_indices()?
            .last()
            .map_or(readable, |last| (last + 1).max(readable));
        if next_page_index > readable {
            ::log::warn!(
                "{} snapshot indices have no readable file; continuing at index {}",
                next_page_index - readable,
                next_page_index
            );
        }

        let state = ResumeState {
            start_url: root.snapshot.url.clone(),
            remaining_links,
            visited_urls,
            next_page_index,
        };
        ::log::info!(
            "Resume state: {} pages done, {} first-level links remaining",
            state.next_page_index,
            state.remaining_links.len()
        );
        Ok(Some(state))
    }
}

/// Build resume state from the filesystem store rooted at `output_dir`
pub fn build_from_dir(output_dir: &Path) -> Result<Option<ResumeState>, StoreError> {
    let store = FsSnapshotStore::new(output_dir);
    ResumeStateBuilder::new(&store).build()
}
