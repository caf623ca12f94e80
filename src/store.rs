use crate::error::StoreError;
use crate::results::{CrawlSummary, PageSnapshot};
use crate::utils::sanitize_filename;
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const PAGES_DIR: &str = "pages";
const SUMMARY_FILE: &str = "summary.json";

/// A snapshot together with the index it was written under
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub index: u64,
    pub snapshot: PageSnapshot,
}

/// Append-only persistence for page snapshots and the crawl summary
pub trait SnapshotStore: Send + Sync {
    /// Write one snapshot. Must fail rather than overwrite an existing index.
    fn write(&self, index: u64, snapshot: &PageSnapshot) -> Result<(), StoreError>;

    /// All readable snapshots ordered by index, or `None` when nothing was
    /// ever written here
    fn read_all(&self) -> Result<Option<Vec<StoredSnapshot>>, StoreError>;

    /// Indices of every snapshot on record, including ones that can no
    /// longer be read back
    fn persisted_indices(&self) -> Result<BTreeSet<u64>, StoreError>;

    fn write_summary(&self, summary: &CrawlSummary) -> Result<(), StoreError>;
}

/// Stores each snapshot as `pages/NNNN_<url>.json` under an output directory
#[derive(Debug)]
pub struct FsSnapshotStore {
    root: PathBuf,
    /// Indices already on disk, loaded by the first write
    taken: Mutex<Option<BTreeSet<u64>>>,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            taken: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    fn scan_indices(&self) -> Result<BTreeSet<u64>, StoreError> {
        let pages = self.pages_dir();
        let mut indices = BTreeSet::new();
        if !pages.is_dir() {
            return Ok(indices);
        }
        for entry in fs::read_dir(&pages)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if !name.ends_with(".json") {
                continue;
            }
            if let Some(index) = parse_index(&name) {
                indices.insert(index);
            }
        }
        Ok(indices)
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn write(&self, index: u64, snapshot: &PageSnapshot) -> Result<(), StoreError> {
        let mut taken = self.taken.lock().unwrap_or_else(PoisonError::into_inner);
        if taken.is_none() {
            *taken = Some(self.scan_indices()?);
        }
        let taken = taken.get_or_insert_with(BTreeSet::new);
        if taken.contains(&index) {
            return Err(StoreError::IndexTaken(index));
        }

        let pages = self.pages_dir();
        fs::create_dir_all(&pages)?;
        let path = pages.join(format!("{:04}_{}.json", index, sanitize_filename(&snapshot.url)));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => StoreError::IndexTaken(index),
                _ => StoreError::Io(e),
            })?;
        // The file exists from here on, so the index is spent even if
        // serialization fails halfway
        taken.insert(index);

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;

        ::log::debug!("Wrote snapshot {}", path.display());
        Ok(())
    }

    fn read_all(&self) -> Result<Option<Vec<StoredSnapshot>>, StoreError> {
        let pages = self.pages_dir();
        if !pages.is_dir() {
            return Ok(None);
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&pages)? {
            let path = entry?.path();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !name.ends_with(".json") {
                continue;
            }
            let Some(index) = parse_index(&name) else {
                ::log::warn!("Ignoring unexpected file {}", path.display());
                continue;
            };

            let parsed = fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|json| serde_json::from_str::<PageSnapshot>(&json).map_err(StoreError::from));
            match parsed {
                Ok(snapshot) => snapshots.push(StoredSnapshot { index, snapshot }),
                Err(e) => ::log::warn!("Skipping unreadable snapshot {}: {}", path.display(), e),
            }
        }

        snapshots.sort_by_key(|s| s.index);
        Ok(Some(snapshots))
    }

    fn persisted_indices(&self) -> Result<BTreeSet<u64>, StoreError> {
        self.scan_indices()
    }

    fn write_summary(&self, summary: &CrawlSummary) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.summary_path();
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(&path, json)?;
        ::log::info!("Wrote crawl summary to {}", path.display());
        Ok(())
    }
}

/// Index encoded in a snapshot filename such as `0007_example.com.json`
fn parse_index(file_name: &str) -> Option<u64> {
    let (digits, _) = file_name.split_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
