//! Key-value store implementations
//!
//! `MemoryStore` backs tests and ephemeral sessions; `FileStore` persists
//! each key as a file under a directory so entries survive restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use ll_core::KeyValueStore;

/// Volatile in-process store.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }
}

/// Store that writes one file per key under a base directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted identifiers, safe as file names
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to read store file");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(error) = write_file(&self.dir, &self.path_for(key), value) {
            tracing::warn!(key, %error, "failed to write store file");
        }
    }
}

fn write_file(dir: &Path, path: &Path, value: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(path, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());
        store.set("a", "1");
        store.set("a", "2");
        assert_eq!(store.get("a").as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("loglens.history").is_none());
        store.set("loglens.history", "[]");
        assert_eq!(store.get("loglens.history").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::new(dir.path()).set("loglens.favorites", "[1,2]");
        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.get("loglens.favorites").as_deref(), Some("[1,2]"));
    }
}
