//! Cache-aside service: a repository fronted by a cache.
//!
//! Every method states its cache behaviour through the decorator it calls, so
//! the read-through / write-through / evict contract is visible right here
//! rather than hidden in annotations.
//!
//! Two key spaces are maintained independently:
//!
//! - by id, written by `find_by_id` and `save`, evicted by `delete`;
//! - by composite key, written by `find_by_composite_key` only.
//!
//! Saving or deleting an entity does **not** touch its composite-key entry.
//! Callers that need it gone use [`CacheAsideService::evict_composite_key`].

use crate::backend::{CacheBackend, InMemoryBackend};
use crate::entity::CacheEntity;
use crate::error::{Error, Result};
use crate::repository::DataRepository;
use crate::service::CacheService;
use crate::strategy::CacheStrategy;
use std::marker::PhantomData;
use std::sync::Arc;

/// Service layer coordinating a [`DataRepository`] with a [`CacheService`].
pub struct CacheAsideService<T, R, B = InMemoryBackend>
where
    T: CacheEntity,
    R: DataRepository<T>,
    B: CacheBackend,
{
    repo: Arc<R>,
    cache: CacheService<B>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, R, B> Clone for CacheAsideService<T, R, B>
where
    T: CacheEntity,
    R: DataRepository<T>,
    B: CacheBackend,
{
    fn clone(&self) -> Self {
        CacheAsideService {
            repo: Arc::clone(&self.repo),
            cache: self.cache.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T, R, B> CacheAsideService<T, R, B>
where
    T: CacheEntity,
    R: DataRepository<T>,
    B: CacheBackend,
{
    pub fn new(repo: Arc<R>, cache: CacheService<B>) -> Self {
        Self {
            repo,
            cache,
            _entity: PhantomData,
        }
    }

    /// Find by id (read-through).
    ///
    /// A cache hit never reaches the repository. An absent result is not cached.
    ///
    /// # Errors
    ///
    /// Repository errors are returned unchanged.
    pub async fn find_by_id(&self, id: &T::Key) -> Result<Option<T>> {
        info!("[Service] Finding {} by id: {}", T::cache_prefix(), id);

        let key = self.cache.expander().id_key::<T>(id);
        self.cache
            .cacheable(&key, || self.repo.fetch_by_id(id))
            .await
    }

    /// Find by (primary, secondary) (read-through).
    ///
    /// Cached under `primary` alone: two lookups sharing `primary` but differing
    /// in `secondary` share one cache entry, and the first one cached wins.
    ///
    /// # Errors
    ///
    /// Repository errors are returned unchanged.
    pub async fn find_by_composite_key(&self, primary: &str, secondary: &str) -> Result<Option<T>> {
        info!(
            "[Service] Finding {} by {}: {} / {}",
            T::cache_prefix(),
            T::lookup_field(),
            primary,
            secondary
        );

        let key = self.cache.expander().lookup_key::<T>(primary);
        self.cache
            .cacheable(&key, || self.repo.fetch_by_composite_key(primary, secondary))
            .await
    }

    /// Save and cache the stored entity under its id (write-through).
    ///
    /// # Errors
    ///
    /// Repository errors are returned unchanged and nothing is cached.
    pub async fn save(&self, entity: &T) -> Result<T> {
        self.save_with(entity, CacheStrategy::Put).await
    }

    /// Save without touching the cache.
    ///
    /// An id entry cached earlier keeps serving the old value until it is
    /// evicted or overwritten.
    ///
    /// # Errors
    ///
    /// Repository errors are returned unchanged.
    pub async fn save_without_caching(&self, entity: &T) -> Result<T> {
        self.save_with(entity, CacheStrategy::Bypass).await
    }

    /// Save with an explicit strategy: `Put` or `Bypass`.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedStrategy` for any other strategy (repository untouched)
    /// - Repository errors, unchanged
    pub async fn save_with(&self, entity: &T, strategy: CacheStrategy) -> Result<T> {
        let id = entity.cache_key();
        info!(
            "[Service] Saving {} {} (strategy: {})",
            T::cache_prefix(),
            id,
            strategy
        );

        match strategy {
            CacheStrategy::Put => {
                let key = self.cache.expander().id_key::<T>(&id);
                self.cache.put(&key, || self.repo.save(entity)).await
            }
            CacheStrategy::Bypass => self.repo.save(entity).await,
            other => Err(Error::UnsupportedStrategy {
                operation: "save",
                strategy: other,
            }),
        }
    }

    /// Delete and evict the id entry.
    ///
    /// # Errors
    ///
    /// Repository errors are returned unchanged and nothing is evicted.
    pub async fn delete(&self, entity: &T) -> Result<()> {
        self.delete_with(entity, CacheStrategy::Evict).await
    }

    /// Delete without evicting.
    ///
    /// A cached id entry survives and `find_by_id` keeps returning the deleted
    /// entity until the entry is evicted or the cache cleared.
    ///
    /// # Errors
    ///
    /// Repository errors are returned unchanged.
    pub async fn delete_without_eviction(&self, entity: &T) -> Result<()> {
        self.delete_with(entity, CacheStrategy::Bypass).await
    }

    /// Delete with an explicit strategy: `Evict` or `Bypass`.
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedStrategy` for any other strategy (repository untouched)
    /// - Repository errors, unchanged
    pub async fn delete_with(&self, entity: &T, strategy: CacheStrategy) -> Result<()> {
        let id = entity.cache_key();
        info!(
            "[Service] Deleting {} {} (strategy: {})",
            T::cache_prefix(),
            id,
            strategy
        );

        match strategy {
            CacheStrategy::Evict => {
                let key = self.cache.expander().id_key::<T>(&id);
                self.cache.evict(&key, || self.repo.delete(entity)).await
            }
            CacheStrategy::Bypass => self.repo.delete(entity).await,
            other => Err(Error::UnsupportedStrategy {
                operation: "delete",
                strategy: other,
            }),
        }
    }

    /// Drop the composite-key entry for `primary`. The repository is not touched.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend fails.
    pub async fn evict_composite_key(&self, primary: &str) -> Result<()> {
        let key = self.cache.expander().lookup_key::<T>(primary);
        self.cache.evict(&key, || async { Ok(()) }).await
    }

    /// Drop every cached entry.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend cannot clear.
    pub async fn clear_cache(&self) -> Result<()> {
        info!("[Service] Clearing cache");
        self.cache.clear().await
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// The cache this service writes to.
    pub fn cache(&self) -> &CacheService<B> {
        &self.cache
    }
}
