use super::support::*;
use crate::crawlers::ResumeStateBuilder;
use crate::crawlers::resume::build_from_dir;
use crate::results::{
    ClassificationResult, Link, LinkType, PageMetadata, PageSnapshot, Viewport,
};
use crate::store::{FsSnapshotStore, SnapshotStore};
use chrono::Utc;

fn snapshot(url: &str, depth: u32, classification: ClassificationResult) -> PageSnapshot {
    PageSnapshot {
        url: url.to_string(),
        depth,
        timestamp: Utc::now(),
        classification,
        metadata: PageMetadata {
            title: String::new(),
            viewport: Viewport::default(),
        },
        content: None,
    }
}

fn root_links(count: usize) -> Vec<Link> {
    (1..=count)
        .map(|i| link(&format!("item-{}", i), LinkType::Entry))
        .collect()
}

#[test]
fn test_remaining_links_after_two_visits() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    let links = root_links(5);

    store
        .write(0, &snapshot(ROOT, 0, entry_page(links.clone())))
        .unwrap();
    store
        .write(1, &snapshot(&links[0].url, 1, ClassificationResult::content_assumed()))
        .unwrap();
    store
        .write(2, &snapshot(&links[1].url, 1, ClassificationResult::content_assumed()))
        .unwrap();

    let state = ResumeStateBuilder::new(&store).build().unwrap().unwrap();

    assert_eq!(state.start_url, ROOT);
    assert_eq!(state.remaining_links, links[2..].to_vec());
    assert_eq!(state.next_page_index, 3);
    assert_eq!(state.visited_urls.len(), 3);
    assert!(state.visited_urls.contains(ROOT));
    assert!(!state.is_complete());
}

#[test]
fn test_missing_output_directory_cannot_resume() {
    let dir = tempfile::tempdir().unwrap();
    assert!(build_from_dir(&dir.path().join("nope")).unwrap().is_none());
}

#[test]
fn test_missing_root_snapshot_cannot_resume() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    store
        .write(1, &snapshot(&url("a"), 1, ClassificationResult::content_assumed()))
        .unwrap();

    assert!(ResumeStateBuilder::new(&store).build().unwrap().is_none());
}

#[test]
fn test_empty_pages_directory_cannot_resume() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    std::fs::create_dir_all(store.pages_dir()).unwrap();

    assert!(ResumeStateBuilder::new(&store).build().unwrap().is_none());
}

#[test]
fn test_building_twice_gives_the_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    let links = root_links(4);
    store
        .write(0, &snapshot(ROOT, 0, entry_page(links.clone())))
        .unwrap();
    store
        .write(1, &snapshot(&links[2].url, 1, ClassificationResult::content_assumed()))
        .unwrap();

    let first = build_from_dir(dir.path()).unwrap().unwrap();
    let second = build_from_dir(dir.path()).unwrap().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_deeper_visits_and_duplicates_are_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    let links = vec![
        link("a", LinkType::Entry),
        link("b", LinkType::Content),
        link("a", LinkType::Entry),
        link("c", LinkType::Entry),
        link("b", LinkType::Content),
    ];
    store
        .write(0, &snapshot(ROOT, 0, entry_page(links)))
        .unwrap();
    // c was reached through a deeper page before the crash
    store
        .write(1, &snapshot(&url("a"), 1, entry_page(vec![link("c", LinkType::Entry)])))
        .unwrap();
    store
        .write(2, &snapshot(&url("c"), 2, ClassificationResult::content_assumed()))
        .unwrap();

    let state = ResumeStateBuilder::new(&store).build().unwrap().unwrap();

    assert_eq!(state.remaining_links, vec![link("b", LinkType::Content)]);
    assert_eq!(state.next_page_index, 3);
}

#[test]
fn test_all_links_visited_means_complete() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    let links = root_links(1);
    store
        .write(0, &snapshot(ROOT, 0, entry_page(links.clone())))
        .unwrap();
    store
        .write(1, &snapshot(&links[0].url, 1, ClassificationResult::content_assumed()))
        .unwrap();

    let state = ResumeStateBuilder::new(&store).build().unwrap().unwrap();
    assert!(state.is_complete());

    let (remaining, crawl_state) = state.into_parts();
    assert!(remaining.is_empty());
    assert_eq!(crawl_state.pages.current(), 2);
    assert!(crawl_state.visited.contains(&links[0].url));
}

#[test]
fn test_unreadable_snapshots_keep_their_index() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    let links = root_links(3);
    store
        .write(0, &snapshot(ROOT, 0, entry_page(links.clone())))
        .unwrap();
    store
        .write(1, &snapshot(&links[0].url, 1, ClassificationResult::content_assumed()))
        .unwrap();
    std::fs::write(store.pages_dir().join("0002_torn.json"), "{ \"url\": ").unwrap();

    let state = ResumeStateBuilder::new(&store).build().unwrap().unwrap();

    assert_eq!(state.remaining_links, links[1..].to_vec());
    assert_eq!(state.visited_urls.len(), 2);
    assert_eq!(state.next_page_index, 3);
}

#[test]
fn test_index_gap_never_reuses_a_taken_index() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsSnapshotStore::new(dir.path());
    let links = root_links(2);
    store
        .write(0, &snapshot(ROOT, 0, entry_page(links.clone())))
        .unwrap();
    store
        .write(2, &snapshot(&links[0].url, 1, ClassificationResult::content_assumed()))
        .unwrap();

    let state = ResumeStateBuilder::new(&store).build().unwrap().unwrap();
    assert_eq!(state.next_page_index, 3);
}
