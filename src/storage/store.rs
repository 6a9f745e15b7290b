//! Key-value blob stores
//!
//! The ledger is persisted as a handful of string blobs under fixed keys. A
//! store only moves those blobs; it knows nothing about their contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::TallyResult;

use super::file_io::{quarantine, read_json, write_json_atomic};

/// A string-keyed blob store
pub trait SnapshotStore {
    /// Read the blob under `key`
    fn get(&self, key: &str) -> TallyResult<Option<String>>;

    /// Write the blob under `key`
    fn set(&mut self, key: &str, value: String) -> TallyResult<()>;

    /// Delete the blob under `key`, if any
    fn remove(&mut self, key: &str) -> TallyResult<()>;

    /// Keys currently present, in ascending order
    fn keys(&self) -> TallyResult<Vec<String>>;

    /// Write several blobs; stores with expensive writes batch them
    fn set_all(&mut self, entries: Vec<(&str, String)>) -> TallyResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &mut S {
    fn get(&self, key: &str) -> TallyResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> TallyResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> TallyResult<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> TallyResult<Vec<String>> {
        (**self).keys()
    }

    fn set_all(&mut self, entries: Vec<(&str, String)>) -> TallyResult<()> {
        (**self).set_all(entries)
    }
}

/// Store that lives only as long as the process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> TallyResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> TallyResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> TallyResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> TallyResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Store kept as one JSON object on disk
///
/// Every write rewrites the whole file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, creating it lazily on first write
    ///
    /// A file that is not a JSON object of strings is moved aside to
    /// `*.json.corrupt` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> TallyResult<Self> {
        let path = path.into();
        let entries = match read_json::<BTreeMap<String, String>, _>(&path) {
            Ok(entries) => entries,
            Err(err) => {
                let moved = quarantine(&path)?;
                warn!(
                    error = %err,
                    moved_to = %moved.display(),
                    "store file unreadable, starting empty"
                );
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk and adopt them only once the write succeeded
    fn commit(&mut self, entries: BTreeMap<String, String>) -> TallyResult<()> {
        write_json_atomic(&self.path, &entries)?;
        self.entries = entries;
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> TallyResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> TallyResult<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value);
        self.commit(entries)
    }

    fn remove(&mut self, key: &str) -> TallyResult<()> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }
        let mut entries = self.entries.clone();
        entries.remove(key);
        self.commit(entries)
    }

    fn keys(&self) -> TallyResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn set_all(&mut self, entries: Vec<(&str, String)>) -> TallyResult<()> {
        let mut updated = self.entries.clone();
        for (key, value) in entries {
            updated.insert(key.to_string(), value);
        }
        self.commit(updated)
    }
}
