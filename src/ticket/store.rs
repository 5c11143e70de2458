//! Indirection Store
//!
//! Key-value contract mapping lookup identifiers to sealed tokens, plus an
//! in-process implementation. No eviction: entries live until overwritten.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Store errors. Always infrastructure faults.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend unreachable or failed.
    #[error("indirection store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup identifier -> envelope map.
#[async_trait]
pub trait IndirectionStore: Send + Sync {
    /// Insert or overwrite one entry.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Fetch one entry.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite many entries in one round trip.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<(), StoreError>;
}

/// Store held in process memory.
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndirectionStore for MemoryStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set_many(&self, batch: &[(String, String)]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        for (key, value) in batch {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}
