//! In-memory cache backend (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-shard locking. Values are
//! replaced whole on every write; there is no expiry.

use super::CacheBackend;
use crate::error::Result;
use crate::key::CacheKeyBuilder;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Thread-safe in-memory cache backend.
///
/// Clones share the same storage.
///
/// # Example
///
/// ```no_run
/// use cache_aside::backend::{CacheBackend, InMemoryBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let backend = InMemoryBackend::new();
///     backend.set("book:id:1", b"value".to_vec()).await?;
///     assert!(backend.get("book:id:1").await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    store: Arc<DashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Create a new in-memory cache backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current number of entries in cache.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Snapshot of the cached keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Entry counts per `namespace:space`, plus total payload size.
    pub fn stats(&self) -> BackendStats {
        let mut per_space = BTreeMap::new();
        let mut total_bytes = 0;

        for entry in self.store.iter() {
            total_bytes += entry.value().len();
            let space = match CacheKeyBuilder::split(entry.key()) {
                Some((namespace, space, _)) => format!("{}:{}", namespace, space),
                None => entry.key().clone(),
            };
            *per_space.entry(space).or_insert(0) += 1;
        }

        BackendStats {
            total_entries: self.store.len(),
            total_bytes,
            per_space,
        }
    }

    /// Print cache statistics to debug log.
    pub fn log_stats(&self) {
        let stats = self.stats();
        debug!(
            "Cache Stats: {} entries, {} bytes, spaces: {:?}",
            stats.total_entries, stats.total_bytes, stats.per_space
        );
    }
}

impl CacheBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.store.get(key).map(|entry| entry.value().clone());
        debug!(
            "✓ InMemory GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.store.insert(key.to_string(), value);
        debug!("✓ InMemory SET {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        debug!("✓ InMemory DELETE {}", key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }

    async fn clear_all(&self) -> Result<()> {
        self.store.clear();
        warn!("⚠ InMemory CLEAR_ALL executed - all cache cleared!");
        Ok(())
    }
}

/// Backend statistics.
#[derive(Clone, Debug, Default)]
pub struct BackendStats {
    pub total_entries: usize,
    pub total_bytes: usize,
    /// Entry count keyed by `"{namespace}:{space}"`, e.g. `"book:id"`.
    pub per_space: BTreeMap<String, usize>,
}

impl BackendStats {
    /// Entries in one key space.
    pub fn entries_in(&self, namespace: &str, space: &str) -> usize {
        self.per_space
            .get(&format!("{}:{}", namespace, space))
            .copied()
            .unwrap_or(0)
    }
}
