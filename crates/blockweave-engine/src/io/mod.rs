//! Persistence hook: "store value under name".
//!
//! The editor writes the JSON document through a [`Storage`] after every
//! committed edit when a persistence key is configured.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub trait Storage: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<String>, IoError>;
    fn store(&self, name: &str, value: &str) -> Result<(), IoError>;
}

/// Process-local storage, mostly for tests and ephemeral editors.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(name: &str, value: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut values) = storage.values.lock() {
            values.insert(name.to_string(), value.to_string());
        }
        storage
    }
}

impl Storage for MemoryStorage {
    fn load(&self, name: &str) -> Result<Option<String>, IoError> {
        let values = self
            .values
            .lock()
            .map_err(|e| IoError::Unavailable(e.to_string()))?;
        Ok(values.get(name).cloned())
    }

    fn store(&self, name: &str, value: &str) -> Result<(), IoError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| IoError::Unavailable(e.to_string()))?;
        values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<name>.json` file per key under `root`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, IoError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !name.starts_with('.');
        if !valid {
            return Err(IoError::InvalidKey(name.to_string()));
        }
        Ok(self.root.join(format!("{name}.json")))
    }
}

impl Storage for FileStorage {
    fn load(&self, name: &str) -> Result<Option<String>, IoError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some).map_err(IoError::Io)
    }

    fn store(&self, name: &str, value: &str) -> Result<(), IoError> {
        let path = self.path_for(name)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(IoError::Io)?;
        }

        fs::write(&path, value).map_err(IoError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.load("doc").unwrap().is_none());
        storage.store("doc", "[]").unwrap();
        assert_eq!(storage.load("doc").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_storage_creates_directories() {
        // Given a storage rooted in a directory that does not exist yet
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/store"));

        // When a value is stored
        storage.store("notes", "[1]").unwrap();

        // Then it lands in <name>.json and loads back
        assert!(dir.path().join("nested/store/notes.json").exists());
        assert_eq!(storage.load("notes").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.load("absent").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(matches!(
                storage.store(key, "x"),
                Err(IoError::InvalidKey(_))
            ));
        }
    }
}
