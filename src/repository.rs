//! Data repository trait for abstracting the persistence store.
//!
//! The cache-aside layer never talks to a database directly. It calls a
//! [`DataRepository`] and decides around that call whether to consult, fill
//! or evict the cache. Any durable or in-memory store can sit behind the trait.
//!
//! # Error Handling
//!
//! Return `Err` for genuine store failures (connectivity, constraint violations,
//! timeouts). A missing row is `Ok(None)`. Errors are passed to the caller
//! unchanged and the cache is left as it was.
//!
//! # Testing
//!
//! [`InMemoryRepository`] is a ready-made store that also counts how often each
//! lookup was issued, which is what cache tests usually need to assert on:
//!
//! ```
//! use cache_aside::{Book, DataRepository, InMemoryRepository};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cache_aside::Result<()> {
//! let repo = InMemoryRepository::with_entities([Book::new(1, "Book1", "AuthorX")]);
//! assert!(repo.fetch_by_id(&1).await?.is_some());
//! assert_eq!(repo.fetch_by_id_calls(&1), 1);
//! # Ok(())
//! # }
//! ```

use crate::entity::CacheEntity;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for data repository implementations.
#[allow(async_fn_in_trait)]
pub trait DataRepository<T: CacheEntity>: Send + Sync {
    /// Fetch entity by ID.
    ///
    /// # Returns
    /// - `Ok(Some(entity))` - Entity found
    /// - `Ok(None)` - Entity not found (not an error)
    /// - `Err(e)` - Store error
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or the fetch fails
    async fn fetch_by_id(&self, id: &T::Key) -> Result<Option<T>>;

    /// Fetch entity by a (primary, secondary) field pair, e.g. title and author.
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the fetch fails
    async fn fetch_by_composite_key(&self, _primary: &str, _secondary: &str) -> Result<Option<T>> {
        Err(crate::error::Error::NotImplemented(
            "fetch_by_composite_key not implemented for this repository".to_string(),
        ))
    }

    /// Insert or fully replace an entity; returns the stored entity.
    ///
    /// # Errors
    /// Returns `Err` if the write fails
    async fn save(&self, entity: &T) -> Result<T>;

    /// Remove an entity. Removing an absent entity is not an error.
    ///
    /// # Errors
    /// Returns `Err` if the delete fails
    async fn delete(&self, entity: &T) -> Result<()>;

    /// Count total entities (optional, for statistics).
    ///
    /// # Errors
    /// Returns `Err` if not implemented or if the store fails
    async fn count(&self) -> Result<u64> {
        Err(crate::error::Error::NotImplemented(
            "count not implemented".to_string(),
        ))
    }
}

// ============================================================================
// In-Memory Repository
// ============================================================================

/// In-memory store with per-lookup call counters.
///
/// All methods take `&self`, so one instance can be shared through an `Arc`
/// between the service under test and the test body.
pub struct InMemoryRepository<T: CacheEntity> {
    data: DashMap<String, T>,
    id_fetches: DashMap<String, usize>,
    composite_fetches: DashMap<(String, String), usize>,
    saves: AtomicUsize,
    deletes: AtomicUsize,
}

impl<T: CacheEntity> InMemoryRepository<T> {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        InMemoryRepository {
            data: DashMap::new(),
            id_fetches: DashMap::new(),
            composite_fetches: DashMap::new(),
            saves: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Create a repository seeded with `entities`. Seeding is not counted as a save.
    pub fn with_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let repo = Self::new();
        for entity in entities {
            repo.insert(entity);
        }
        repo
    }

    /// Insert or replace an entity without touching the counters.
    pub fn insert(&self, entity: T) {
        self.data.insert(entity.cache_key().to_string(), entity);
    }

    /// Current stored value for `id`, without touching the counters.
    pub fn get(&self, id: &T::Key) -> Option<T> {
        self.data.get(&id.to_string()).map(|e| e.value().clone())
    }

    /// Remove all entities. Counters are kept.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Return the number of entities in the repository.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if the repository contains no entities.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// How many times `fetch_by_id` was called with `id`.
    pub fn fetch_by_id_calls(&self, id: &T::Key) -> usize {
        self.id_fetches
            .get(&id.to_string())
            .map(|n| *n)
            .unwrap_or(0)
    }

    /// How many times `fetch_by_id` was called in total.
    pub fn total_fetch_by_id_calls(&self) -> usize {
        self.id_fetches.iter().map(|n| *n.value()).sum()
    }

    /// How many times `fetch_by_composite_key` was called with this pair.
    pub fn fetch_by_composite_key_calls(&self, primary: &str, secondary: &str) -> usize {
        self.composite_fetches
            .get(&(primary.to_string(), secondary.to_string()))
            .map(|n| *n)
            .unwrap_or(0)
    }

    /// How many times `save` was called.
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// How many times `delete` was called.
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::Relaxed)
    }
}

impl<T: CacheEntity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CacheEntity> DataRepository<T> for InMemoryRepository<T> {
    async fn fetch_by_id(&self, id: &T::Key) -> Result<Option<T>> {
        let key = id.to_string();
        *self.id_fetches.entry(key.clone()).or_insert(0) += 1;
        Ok(self.data.get(&key).map(|e| e.value().clone()))
    }

    async fn fetch_by_composite_key(&self, primary: &str, secondary: &str) -> Result<Option<T>> {
        *self
            .composite_fetches
            .entry((primary.to_string(), secondary.to_string()))
            .or_insert(0) += 1;

        Ok(self
            .data
            .iter()
            .find(|e| e.value().lookup_fields() == Some((primary, secondary)))
            .map(|e| e.value().clone()))
    }

    async fn save(&self, entity: &T) -> Result<T> {
        self.saves.fetch_add(1, Ordering::Relaxed);
        self.insert(entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, entity: &T) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        self.data.remove(&entity.cache_key().to_string());
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;

    #[tokio::test]
    async fn test_fetch_by_id_counts_calls() {
        let repo = InMemoryRepository::with_entities([Book::new(1, "Book1", "AuthorX")]);

        let hit = repo.fetch_by_id(&1).await.expect("Failed to fetch");
        assert_eq!(hit.expect("Entity not found").title, "Book1");

        let miss = repo.fetch_by_id(&10).await.expect("Failed to fetch");
        assert!(miss.is_none());

        assert_eq!(repo.fetch_by_id_calls(&1), 1);
        assert_eq!(repo.fetch_by_id_calls(&10), 1);
        assert_eq!(repo.fetch_by_id_calls(&2), 0);
        assert_eq!(repo.total_fetch_by_id_calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_by_composite_key_matches_both_fields() {
        let repo = InMemoryRepository::with_entities([
            Book::new(1, "Dune", "Frank Herbert"),
            Book::new(2, "Dune", "Someone Else"),
        ]);

        let found = repo
            .fetch_by_composite_key("Dune", "Frank Herbert")
            .await
            .expect("Failed to fetch");
        assert_eq!(found.map(|b| b.id), Some(1));

        let missing = repo
            .fetch_by_composite_key("Dune", "Nobody")
            .await
            .expect("Failed to fetch");
        assert!(missing.is_none());

        assert_eq!(repo.fetch_by_composite_key_calls("Dune", "Frank Herbert"), 1);
        assert_eq!(repo.fetch_by_composite_key_calls("Dune", "Nobody"), 1);
    }

    #[tokio::test]
    async fn test_save_replaces_and_delete_removes() {
        let repo = InMemoryRepository::new();

        repo.save(&Book::new(4, "Draft", "A"))
            .await
            .expect("Failed to save");
        repo.save(&Book::new(4, "Final", "A"))
            .await
            .expect("Failed to save");
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(&4).map(|b| b.title), Some("Final".to_string()));

        repo.delete(&Book::new(4, "Final", "A"))
            .await
            .expect("Failed to delete");
        assert!(repo.is_empty());

        assert_eq!(repo.save_calls(), 2);
        assert_eq!(repo.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_seeding_is_not_counted() {
        let repo = InMemoryRepository::with_entities([Book::new(1, "Book1", "AuthorX")]);
        assert_eq!(repo.save_calls(), 0);
        assert_eq!(repo.count().await.expect("Failed to count"), 1);
    }

    #[tokio::test]
    async fn test_clear_keeps_counters() {
        let repo = InMemoryRepository::with_entities([
            Book::new(1, "Book1", "AuthorX"),
            Book::new(2, "Book2", "AuthorY"),
        ]);
        repo.fetch_by_id(&1).await.expect("Failed to fetch");

        repo.clear();

        assert!(repo.is_empty());
        assert!(repo.fetch_by_id(&1).await.expect("Failed to fetch").is_none());
        assert_eq!(repo.fetch_by_id_calls(&1), 2);
    }
}
