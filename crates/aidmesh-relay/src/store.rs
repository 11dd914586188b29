//! Durable store collaborator
//!
//! The queue and seen-set snapshots are the only state that must
//! survive a restart. The store is a plain key/value surface; write
//! failures are logged by the caller and in-memory state stays
//! authoritative until the next successful write.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key/value persistence for queue and seen-set snapshots
pub trait StateStore: Send + Sync {
    /// Read a value. `None` for missing keys or unreadable entries.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &[u8]) -> io::Result<()>;
}

/// Volatile store, used when no durable backing is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.map
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> io::Result<()> {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_vec());
        }
        Ok(())
    }
}

/// One file per key under a directory
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating the directory if needed).
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &[u8]) -> io::Result<()> {
        // write-then-rename so a crash mid-write never truncates the
        // previous snapshot
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path_for(key))
    }
}
