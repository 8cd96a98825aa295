//! Cache expander: the read-through, write-through and evict decorators.
//!
//! Each decorator takes the cache key and a closure performing the real
//! operation (usually a repository call), and wraps the cache behaviour of one
//! [`CacheStrategy`] around it:
//!
//! ```ignore
//! let key = expander.id_key::<Book>(&id);
//! let book = expander.cacheable(&key, || repo.fetch_by_id(&id)).await?;
//! let saved = expander.put(&key, || repo.save(&book)).await?;
//! expander.evict(&key, || repo.delete(&book)).await?;
//! ```
//!
//! Operations on the same key are serialized through a per-key async lock, so
//! a read-through miss, a write-through and an eviction for one key never
//! interleave. A lock lives only while someone holds or waits for it. Closures
//! passed in must not call back into the expander for the same key.

use crate::backend::CacheBackend;
use crate::config::CacheConfig;
use crate::entity::CacheEntity;
use crate::error::Result;
use crate::key::CacheKeyBuilder;
use crate::observability::{CacheMetrics, NoOpMetrics};
use crate::strategy::CacheStrategy;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Core cache expander - handles cache lookup, population and eviction.
///
/// # Example
///
/// ```ignore
/// use cache_aside::{CacheExpander, backend::InMemoryBackend};
///
/// let expander = CacheExpander::new(InMemoryBackend::new());
/// ```
pub struct CacheExpander<B: CacheBackend> {
    backend: B,
    metrics: Box<dyn CacheMetrics>,
    config: CacheConfig,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<B: CacheBackend> CacheExpander<B> {
    /// Create new expander with given backend and default configuration.
    pub fn new(backend: B) -> Self {
        CacheExpander {
            backend,
            metrics: Box::new(NoOpMetrics),
            config: CacheConfig::default(),
            key_locks: DashMap::new(),
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration does not validate.
    pub fn with_config(mut self, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Key under which an entity with `id` is cached.
    pub fn id_key<T: CacheEntity>(&self, id: &T::Key) -> String {
        CacheKeyBuilder::for_id::<T>(self.config.namespace_or(T::cache_prefix()), id)
    }

    /// Key under which a composite lookup on `primary` is cached.
    pub fn lookup_key<T: CacheEntity>(&self, primary: &str) -> String {
        CacheKeyBuilder::for_lookup::<T>(self.config.namespace_or(T::cache_prefix()), primary)
    }

    /// Read-through: return the cached entity, or run `loader` on a miss and
    /// cache what it returns.
    ///
    /// `Ok(None)` from the loader is passed through and never cached, so the
    /// next call for the same key runs the loader again.
    ///
    /// # Errors
    ///
    /// - Loader errors are returned unchanged; the cache is not modified
    /// - `Error::BackendError` if the backend fails on read
    /// - `Error::ValidationError` if a cached entity fails `validate()`
    pub async fn cacheable<T, F, Fut>(&self, cache_key: &str, loader: F) -> Result<Option<T>>
    where
        T: CacheEntity,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        if !self.config.enabled {
            return loader().await;
        }

        let timer = Instant::now();
        debug!(
            "» Cache operation for key: {} (strategy: {})",
            cache_key,
            CacheStrategy::Cacheable
        );

        if let Some(entity) = self.peek::<T>(cache_key).await? {
            self.metrics.record_hit(cache_key, timer.elapsed());
            return Ok(Some(entity));
        }

        let _guard = self.lock_key(cache_key).await;

        // Filled by another caller while we waited for the lock
        if let Some(entity) = self.peek::<T>(cache_key).await? {
            self.metrics.record_hit(cache_key, timer.elapsed());
            return Ok(Some(entity));
        }

        self.metrics.record_miss(cache_key, timer.elapsed());
        debug!("Cache miss, falling back to repository");

        let loaded = loader().await.map_err(|e| {
            self.metrics.record_error(cache_key, &e.to_string());
            e
        })?;

        match loaded {
            Some(entity) => {
                self.store(cache_key, &entity).await;
                info!("✓ Cache populated for {} in {:?}", cache_key, timer.elapsed());
                Ok(Some(entity))
            }
            None => {
                debug!("Nothing found for {}, result not cached", cache_key);
                Ok(None)
            }
        }
    }

    /// Write-through: run `writer`, then cache its result under `cache_key`.
    ///
    /// # Errors
    ///
    /// Writer errors are returned unchanged and nothing is cached. A failure to
    /// write the cache itself is logged and does not fail the call; the old
    /// entry is dropped instead, so the next read goes to the repository.
    pub async fn put<T, F, Fut>(&self, cache_key: &str, writer: F) -> Result<T>
    where
        T: CacheEntity,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.config.enabled {
            return writer().await;
        }

        debug!(
            "» Cache operation for key: {} (strategy: {})",
            cache_key,
            CacheStrategy::Put
        );

        let _guard = self.lock_key(cache_key).await;

        let entity = writer().await.map_err(|e| {
            self.metrics.record_error(cache_key, &e.to_string());
            e
        })?;

        if !self.store(cache_key, &entity).await {
            if let Err(e) = self.backend.delete(cache_key).await {
                error!("Stale entry {} could not be dropped: {}", cache_key, e);
                self.metrics.record_error(cache_key, &e.to_string());
            }
        }
        Ok(entity)
    }

    /// Run `op`, then evict `cache_key`. Nothing is evicted if `op` fails.
    ///
    /// # Errors
    ///
    /// - Errors from `op` are returned unchanged
    /// - `Error::BackendError` if the eviction itself fails
    pub async fn evict<O, F, Fut>(&self, cache_key: &str, op: F) -> Result<O>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<O>>,
    {
        if !self.config.enabled {
            return op().await;
        }

        debug!(
            "» Cache operation for key: {} (strategy: {})",
            cache_key,
            CacheStrategy::Evict
        );

        let _guard = self.lock_key(cache_key).await;

        let output = op().await.map_err(|e| {
            self.metrics.record_error(cache_key, &e.to_string());
            e
        })?;

        self.backend.delete(cache_key).await?;
        self.metrics.record_evict(cache_key);
        debug!("✓ Cache evicted for {}", cache_key);
        Ok(output)
    }

    /// Drop every cached entry.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend cannot clear.
    pub async fn clear(&self) -> Result<()> {
        self.backend.clear_all().await
    }

    /// Look at the cache without falling back to anything.
    ///
    /// Unreadable entries (bad magic, old schema, corrupt payload) are removed
    /// and reported as absent.
    ///
    /// # Errors
    ///
    /// - `Error::BackendError` if the backend fails
    /// - `Error::ValidationError` if the cached entity fails `validate()`
    pub async fn peek<T: CacheEntity>(&self, cache_key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.backend.get(cache_key).await? else {
            return Ok(None);
        };

        match T::deserialize_from_cache(&bytes) {
            Ok(entity) => {
                entity.validate()?;
                Ok(Some(entity))
            }
            Err(e) if e.is_corrupt_entry() => {
                warn!("Dropping unreadable cache entry {}: {}", cache_key, e);
                self.metrics.record_error(cache_key, &e.to_string());
                self.backend.delete(cache_key).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get backend reference (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Encode and write `entity`; `false` if nothing was written.
    async fn store<T: CacheEntity>(&self, cache_key: &str, entity: &T) -> bool {
        let started = Instant::now();
        let result = match entity.serialize_for_cache() {
            Ok(bytes) => self.backend.set(cache_key, bytes).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.metrics.record_put(cache_key, started.elapsed());
                true
            }
            Err(e) => {
                warn!("Failed to cache {}: {}", cache_key, e);
                self.metrics.record_error(cache_key, &e.to_string());
                false
            }
        }
    }

    async fn lock_key<'a>(&'a self, cache_key: &'a str) -> KeyGuard<'a> {
        let lock = Arc::clone(
            self.key_locks
                .entry(cache_key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let mut guard = KeyGuard {
            locks: &self.key_locks,
            key: cache_key,
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }
}

/// Holds the lock for one key and drops its map entry once nobody else
/// holds or waits for it.
struct KeyGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        // Waiters hold a clone of the Arc, so only an unused lock has count 1
        self.locks
            .remove_if(self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
