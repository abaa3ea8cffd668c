//! Persistence for icon sets and the uploaded-filename registry.
//!
//! The store keeps one JSON record per font file (keyed through
//! [`derive_key`]) plus a single registry record listing every filename
//! that has been saved. Storage itself sits behind [`StorageBackend`] so
//! hosts can plug in whatever key-value substrate they have; the crate
//! ships a filesystem backend and an in-memory backend.
//!
//! Reads degrade: a missing key, an unreadable backend, or corrupt JSON all
//! come back as an empty result with a logged warning, so stale caches can
//! never wedge a font upload. Writes surface their errors.

mod key;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::icon::IconRecord;

pub use key::derive_key;

/// Key of the filename registry record. Data keys all carry the
/// `glyphbench.set.` prefix, so a font literally named `registry` can
/// never collide with this.
const REGISTRY_KEY: &str = "glyphbench.registry";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be read or written.
    #[error("storage backend error: {0}")]
    Io(#[from] io::Error),

    /// A persisted value could not be encoded or decoded.
    #[error("invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A save was requested with no active font file to key it under.
    #[error("no font file is active")]
    NoActiveFile,
}

// ============================================================================
// Backends
// ============================================================================

/// A string key-value substrate the store persists into.
pub trait StorageBackend {
    /// Reads the value under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, replacing any existing value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the value under `key`. Absent keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Returns true if a value exists under `key`.
    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-memory backend for tests and embedders with their own persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    map: HashMap<String, String>,
}

impl MemoryBackend {
    /// Creates an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.map.contains_key(key))
    }
}

/// Filesystem backend: one file per key under a root directory.
///
/// The root is created on first write. Derived keys contain only
/// filesystem-safe characters, so keys map directly to file names.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    /// Creates a backend rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory this backend writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl StorageBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(key).is_file())
    }
}

// ============================================================================
// IconStore
// ============================================================================

/// Persistence of icon sets keyed by font filename, plus the registry of
/// filenames that have ever been saved.
#[derive(Debug, Clone, Default)]
pub struct IconStore<S> {
    backend: S,
}

impl<S: StorageBackend> IconStore<S> {
    /// Creates a store over the given backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Loads the saved icon set for `file_name`.
    ///
    /// Never fails: a missing entry, a backend error, or corrupt JSON all
    /// yield an empty vector (the latter two with a warning), and the
    /// caller falls back to fresh extraction.
    pub fn load(&self, file_name: &str) -> Vec<IconRecord> {
        let key = derive_key(file_name);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("failed to read icon set for {file_name:?}: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!("discarding corrupt icon set for {file_name:?}: {err}");
                Vec::new()
            }
        }
    }

    /// Saves `records` under `file_name` and registers the filename.
    pub fn save(&mut self, file_name: &str, records: &[IconRecord]) -> Result<(), StoreError> {
        let key = derive_key(file_name);
        let json = serde_json::to_string(records)?;
        self.backend.set(&key, &json)?;
        self.registry_add(file_name)
    }

    /// Deletes the saved icon set for `file_name` and unregisters it.
    pub fn delete(&mut self, file_name: &str) -> Result<(), StoreError> {
        let key = derive_key(file_name);
        self.backend.remove(&key)?;
        self.registry_remove(file_name)
    }

    /// Returns true if an icon set is saved for `file_name`.
    ///
    /// Backend failures map to `false` so callers can branch on this
    /// without error handling.
    pub fn is_saved(&self, file_name: &str) -> bool {
        self.backend
            .contains(&derive_key(file_name))
            .unwrap_or(false)
    }

    /// Lists every registered filename, in registration order.
    ///
    /// An absent or corrupt registry reads as empty.
    pub fn registry_list(&self) -> Vec<String> {
        let raw = match self.backend.get(REGISTRY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("failed to read filename registry: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(names) => names,
            Err(err) => {
                warn!("discarding corrupt filename registry: {err}");
                Vec::new()
            }
        }
    }

    /// Adds `file_name` to the registry. Already-registered names are left
    /// in place, so the registry never holds duplicates.
    pub fn registry_add(&mut self, file_name: &str) -> Result<(), StoreError> {
        let mut names = self.registry_list();
        if names.iter().any(|n| n == file_name) {
            return Ok(());
        }
        names.push(file_name.to_string());
        let json = serde_json::to_string(&names)?;
        self.backend.set(REGISTRY_KEY, &json)
    }

    /// Removes `file_name` from the registry. Absent names are a no-op.
    pub fn registry_remove(&mut self, file_name: &str) -> Result<(), StoreError> {
        let mut names = self.registry_list();
        let before = names.len();
        names.retain(|n| n != file_name);
        if names.len() == before {
            return Ok(());
        }
        let json = serde_json::to_string(&names)?;
        self.backend.set(REGISTRY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::{IconRecord, ViewBox};

    fn sample_records() -> Vec<IconRecord> {
        vec![
            IconRecord::new(65, "a", ViewBox::new(0.0, 0.0, 10.0, 10.0), "M0 0Z"),
            IconRecord::new(66, "b", ViewBox::new(0.0, 0.0, 20.0, 20.0), "M1 1Z"),
        ]
    }

    /// Backend whose every operation fails, for degradation tests.
    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(io::Error::other("backend down").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(io::Error::other("backend down").into())
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(io::Error::other("backend down").into())
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = IconStore::new(MemoryBackend::new());
        let records = sample_records();

        store.save("icons.ttf", &records).unwrap();
        assert_eq!(store.load("icons.ttf"), records);
        assert!(store.is_saved("icons.ttf"));
    }

    #[test]
    fn load_missing_is_empty() {
        let store = IconStore::new(MemoryBackend::new());
        assert!(store.load("never-saved.ttf").is_empty());
        assert!(!store.is_saved("never-saved.ttf"));
    }

    #[test]
    fn load_corrupt_is_empty() {
        let mut backend = MemoryBackend::new();
        backend.set(&derive_key("bad.ttf"), "{not json").unwrap();

        let store = IconStore::new(backend);
        assert!(store.load("bad.ttf").is_empty());
    }

    #[test]
    fn save_registers_filename_once() {
        let mut store = IconStore::new(MemoryBackend::new());
        let records = sample_records();

        store.save("icons.ttf", &records).unwrap();
        store.save("icons.ttf", &records).unwrap();
        store.save("other.ttf", &records).unwrap();

        assert_eq!(store.registry_list(), ["icons.ttf", "other.ttf"]);
    }

    #[test]
    fn delete_removes_record_and_registration() {
        let mut store = IconStore::new(MemoryBackend::new());
        store.save("icons.ttf", &sample_records()).unwrap();

        store.delete("icons.ttf").unwrap();
        assert!(!store.is_saved("icons.ttf"));
        assert!(store.load("icons.ttf").is_empty());
        assert!(store.registry_list().is_empty());
    }

    #[test]
    fn registry_remove_of_absent_name_is_noop() {
        let mut store = IconStore::new(MemoryBackend::new());
        store.save("icons.ttf", &sample_records()).unwrap();

        store.registry_remove("unknown.ttf").unwrap();
        assert_eq!(store.registry_list(), ["icons.ttf"]);
    }

    #[test]
    fn corrupt_registry_reads_as_empty() {
        let mut backend = MemoryBackend::new();
        backend.set(REGISTRY_KEY, "42").unwrap();

        let store = IconStore::new(backend);
        assert!(store.registry_list().is_empty());
    }

    #[test]
    fn font_named_registry_does_not_clobber_registry() {
        let mut store = IconStore::new(MemoryBackend::new());
        store.save("first.ttf", &sample_records()).unwrap();
        store.save("registry", &sample_records()).unwrap();

        assert_eq!(store.registry_list(), ["first.ttf", "registry"]);
        assert_eq!(store.load("registry"), sample_records());
    }

    #[test]
    fn failing_backend_degrades_reads() {
        let store = IconStore::new(FailingBackend);
        assert!(store.load("icons.ttf").is_empty());
        assert!(!store.is_saved("icons.ttf"));
        assert!(store.registry_list().is_empty());
    }

    #[test]
    fn failing_backend_surfaces_write_errors() {
        let mut store = IconStore::new(FailingBackend);
        let err = store.save("icons.ttf", &sample_records()).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn fs_backend_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = IconStore::new(FsBackend::new(dir.path()));
        let records = sample_records();

        store.save("icons.ttf", &records).unwrap();
        assert_eq!(store.load("icons.ttf"), records);
        assert!(store.is_saved("icons.ttf"));
        assert_eq!(store.registry_list(), ["icons.ttf"]);

        store.delete("icons.ttf").unwrap();
        assert!(!store.is_saved("icons.ttf"));
    }

    #[test]
    fn fs_backend_missing_root_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = IconStore::new(FsBackend::new(dir.path().join("never-created")));
        assert!(store.load("icons.ttf").is_empty());
        assert!(!store.is_saved("icons.ttf"));
    }

    #[test]
    fn fs_backend_tolerates_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FsBackend::new(dir.path());
        backend.set(&derive_key("bad.ttf"), "[{\"nope\"").unwrap();

        let store = IconStore::new(backend);
        assert!(store.load("bad.ttf").is_empty());
    }
}
