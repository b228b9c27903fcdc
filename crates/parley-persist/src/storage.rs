//! Key-value snapshot storage backends.
//!
//! `FileStorage` is the durable backend (one file per key, atomic
//! temp-then-rename writes). `MemoryStorage` is a fake for tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::PersistError;

/// Key-value storage for serialized conversation snapshots.
///
/// The conversation core never touches a concrete backend directly; the
/// bridge is handed an implementation at construction time.
pub trait SnapshotStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write `value` under `key`, replacing any previous value. A concurrent
    /// reader must never observe a half-written value.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// File-backed storage: one `<key>.json` file per key under a root
/// directory.
///
/// Writes go to a temp file in the same directory followed by a rename, so
/// a reader sees either the old snapshot or the new one, never a partial
/// write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.root)?;
        let target = self.path_for(key);
        // Same-directory temp file so the rename stays on one filesystem.
        let tmp = self.root.join(format!(".{}.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &target)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage fake for tests.
///
/// Clones share the same underlying map, so a test can hand one handle to
/// the bridge and keep another for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value directly, bypassing the bridge (e.g., to simulate a
    /// corrupt snapshot left behind by an older client).
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("memory storage lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    /// Raw stored value for assertions.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory storage lock poisoned")
            .get(key)
            .cloned()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self
            .entries
            .lock()
            .map_err(|e| PersistError::Serialization(format!("lock poisoned: {}", e)))?
            .get(key)
            .cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries
            .lock()
            .map_err(|e| PersistError::Serialization(format!("lock poisoned: {}", e)))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        self.entries
            .lock()
            .map_err(|e| PersistError::Serialization(format!("lock poisoned: {}", e)))?
            .remove(key);
        Ok(())
    }
}
