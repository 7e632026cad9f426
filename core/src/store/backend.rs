// Storage abstraction for the durable mirror
//
// The tracker writes its whole state under a single string key, so backends only
// need keyed get/overwrite. Values are opaque bytes; encoding is the caller's job.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Async key-value storage used as the durable mirror
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if it was never written
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, String>;

    /// Overwrite the full value stored under `key`
    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), String>;
}

/// In-memory storage useful for testing and ephemeral sessions
///
/// Clones share the same underlying map, so a clone handed to a second tracker
/// behaves like the same disk seen after a restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, String> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), String> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// Persistent sled-backed storage
pub struct SledStorage {
    db: sled::Db,
}

impl SledStorage {
    /// Open (or create) a sled database at `path`
    pub fn new(path: &str) -> Result<Self, String> {
        let db = sled::open(path).map_err(|e| e.to_string())?;
        Ok(Self { db })
    }

    /// Wrap an already opened database
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStorage for SledStorage {
    async fn get_item(&self, key: &str) -> Result<Option<Vec<u8>>, String> {
        let value = self.db.get(key.as_bytes()).map_err(|e| e.to_string())?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    async fn set_item(&self, key: &str, value: Vec<u8>) -> Result<(), String> {
        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| e.to_string())?;
        // Write-through must be on disk before the caller sees success
        self.db.flush().map_err(|e| e.to_string())?;
        Ok(())
    }
}
