//! Cache backend implementations.

use crate::error::Result;

pub mod inmemory;

pub use inmemory::{BackendStats, InMemoryBackend};

/// Trait for process-local cache storage.
///
/// Entries hold serialized entities and never expire on their own; they leave
/// the cache only through `delete` or `clear_all`.
///
/// All methods take `&self`. Implementations use interior mutability and must
/// store and return each value as a whole, so a reader never sees a partial write.
#[allow(async_fn_in_trait)]
pub trait CacheBackend: Send + Sync + Clone {
    /// Retrieve value from cache by key.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store value in cache, replacing any previous value.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove value from cache. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if key exists in cache.
    ///
    /// # Errors
    /// Returns `Err` if the backend fails
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Drop every entry.
    ///
    /// # Errors
    /// Returns `Err` if operation is not implemented or fails
    async fn clear_all(&self) -> Result<()> {
        Err(crate::error::Error::NotImplemented(
            "clear_all not implemented for this backend".to_string(),
        ))
    }
}
