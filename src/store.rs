//! Local key-value persistence.
//!
//! Small string values (a counter, a serialized settings object) are kept
//! under string keys. The file-backed store writes the whole map as pretty
//! JSON on every change.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Minimal key-value storage interface.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> io::Result<()>;
    fn remove(&mut self, key: &str) -> io::Result<()>;

    /// Read a value as an unsigned counter, treating missing or garbled
    /// values as zero.
    fn get_counter(&self, key: &str) -> u64 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Add `by` to a counter and return the new value.
    fn increment(&mut self, key: &str, by: u64) -> io::Result<u64> {
        let value = self.get_counter(key).saturating_add(by);
        self.set(key, value.to_string())?;
        Ok(value)
    }
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON file holding a flat string map.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store, loading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(io::Error::other)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(io::Error::other)?;
        std::fs::write(&self.path, json)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shakelock-store-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_memory_store_counter() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_counter("lock_count"), 0);
        assert_eq!(store.increment("lock_count", 2).unwrap(), 2);
        assert_eq!(store.increment("lock_count", 1).unwrap(), 3);

        store.set("lock_count", "garbage".to_string()).unwrap();
        assert_eq!(store.get_counter("lock_count"), 0);
    }

    #[test]
    fn test_file_store_persists() {
        let path = temp_path("store.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.set("settings", "{\"a\":1}".to_string()).unwrap();
            store.increment("lock_count", 4).unwrap();
        }

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("settings").as_deref(), Some("{\"a\":1}"));
        assert_eq!(store.get_counter("lock_count"), 4);

        store.remove("settings").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("settings").is_none());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = temp_path("corrupt.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(JsonFileStore::open(&path).is_err());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
