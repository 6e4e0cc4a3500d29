use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;

/// Named text slots that outlive the process.
pub trait KeyValueStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, slot: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store, optionally capped to mimic a storage quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any write whose value is longer than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota: Some(bytes),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(StorageError::Rejected {
                    slot: slot.to_string(),
                    reason: format!("quota of {} bytes exceeded ({} bytes)", quota, value.len()),
                });
            }
        }
        self.slots.insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per slot, `<dir>/<slot>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", slot))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(slot);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, slot: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;

        // a failed write leaves the previous contents in place
        let path = self.slot_path(slot);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("slot").unwrap(), None);

        store.set("slot", "value").unwrap();

        assert_eq!(store.get("slot").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn memory_store_quota_rejects_large_writes() {
        let mut store = MemoryStore::with_quota(4);

        assert!(store.set("slot", "1234").is_ok());
        assert!(matches!(
            store.set("slot", "12345"),
            Err(StorageError::Rejected { .. })
        ));
        assert_eq!(store.get("slot").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn file_store_missing_slot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn file_store_creates_directory_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("decks");
        let mut store = FileStore::new(&nested);

        store.set("saved", "[]").unwrap();
        store.set("saved", "[1]").unwrap();

        let reopened = FileStore::new(&nested);
        assert_eq!(reopened.get("saved").unwrap().as_deref(), Some("[1]"));
        assert!(nested.join("saved.json").exists());
        assert!(!nested.join("saved.json.tmp").exists());
    }
}
