//! Durable key/value storage for autosave records.
//!
//! Values are opaque strings (JSON in practice). [`FileStorage`] keeps one
//! file per key; [`MemoryStorage`] is shared between clones so two sessions
//! can be pointed at the same store, and can be told to fail writes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::StorageError;

/// Key of the latest autosave record
pub const LATEST_KEY: &str = "mindmap-autosave";

/// Key of the save slot list
pub const SLOTS_KEY: &str = "mindmap-autosave-history";

pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        // Readers never observe a half-written record
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    values: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory storage; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write and remove fail (e.g. quota exceeded)
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make every following read fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().values.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.lock();
        if state.fail_reads {
            return Err(StorageError::Unavailable("storage is not readable".to_string()));
        }
        Ok(state.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable("storage quota exceeded".to_string()));
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable("storage is read-only".to_string()));
        }
        state.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("store"));

        assert_eq!(storage.read(LATEST_KEY).unwrap(), None);
        storage.write(LATEST_KEY, "{\"a\":1}").unwrap();
        assert_eq!(storage.read(LATEST_KEY).unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.path().join("store/mindmap-autosave.json").exists());
        assert!(!dir.path().join("store/mindmap-autosave.json.tmp").exists());

        storage.remove(LATEST_KEY).unwrap();
        storage.remove(LATEST_KEY).unwrap();
        assert_eq!(storage.read(LATEST_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_sanitizes_keys() {
        let storage = FileStorage::new("/tmp/x");
        assert_eq!(storage.path_for("../etc/passwd"), PathBuf::from("/tmp/x/___etc_passwd.json"));
    }

    #[test]
    fn test_memory_storage_shared_and_failing() {
        let mut first = MemoryStorage::new();
        let second = first.clone();

        first.write(SLOTS_KEY, "[]").unwrap();
        assert_eq!(second.read(SLOTS_KEY).unwrap().as_deref(), Some("[]"));

        second.set_fail_writes(true);
        assert!(matches!(
            first.write(SLOTS_KEY, "[1]"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(first.read(SLOTS_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(first.keys(), vec![SLOTS_KEY.to_string()]);
    }
}
