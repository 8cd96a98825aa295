//! Shareable cache handle.
//!
//! Provides a cheap-to-clone wrapper around [`CacheExpander`] for sharing one
//! cache between several services or tasks.

use crate::backend::CacheBackend;
use crate::config::CacheConfig;
use crate::entity::CacheEntity;
use crate::error::Result;
use crate::expander::CacheExpander;
use crate::observability::CacheMetrics;
use std::future::Future;
use std::sync::Arc;

/// Cache handle shared across services and tasks.
///
/// Backends use interior mutability and the expander only needs `&self`, so an
/// `Arc` is enough; no extra `Mutex` is required.
///
/// # Example
///
/// ```ignore
/// use cache_aside::{CacheService, backend::InMemoryBackend};
///
/// let cache = CacheService::new(InMemoryBackend::new());
/// let books = BookService::new(repo.clone(), cache.clone());
/// ```
#[derive(Clone)]
pub struct CacheService<B: CacheBackend> {
    expander: Arc<CacheExpander<B>>,
}

impl<B: CacheBackend> CacheService<B> {
    /// Create a new cache service with the given backend.
    pub fn new(backend: B) -> Self {
        CacheService {
            expander: Arc::new(CacheExpander::new(backend)),
        }
    }

    /// Create a new cache service with custom metrics.
    pub fn with_metrics(backend: B, metrics: Box<dyn CacheMetrics>) -> Self {
        CacheService {
            expander: Arc::new(CacheExpander::new(backend).with_metrics(metrics)),
        }
    }

    /// Create a new cache service with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration does not validate.
    pub fn with_config(backend: B, config: CacheConfig) -> Result<Self> {
        Ok(CacheService {
            expander: Arc::new(CacheExpander::new(backend).with_config(config)?),
        })
    }

    /// Wrap a fully configured expander.
    pub fn from_expander(expander: CacheExpander<B>) -> Self {
        CacheService {
            expander: Arc::new(expander),
        }
    }

    /// Read-through; see [`CacheExpander::cacheable`].
    ///
    /// # Errors
    ///
    /// Same as [`CacheExpander::cacheable`].
    pub async fn cacheable<T, F, Fut>(&self, cache_key: &str, loader: F) -> Result<Option<T>>
    where
        T: CacheEntity,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        self.expander.cacheable(cache_key, loader).await
    }

    /// Write-through; see [`CacheExpander::put`].
    ///
    /// # Errors
    ///
    /// Same as [`CacheExpander::put`].
    pub async fn put<T, F, Fut>(&self, cache_key: &str, writer: F) -> Result<T>
    where
        T: CacheEntity,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.expander.put(cache_key, writer).await
    }

    /// Evict after success; see [`CacheExpander::evict`].
    ///
    /// # Errors
    ///
    /// Same as [`CacheExpander::evict`].
    pub async fn evict<O, F, Fut>(&self, cache_key: &str, op: F) -> Result<O>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<O>>,
    {
        self.expander.evict(cache_key, op).await
    }

    /// Drop every cached entry.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend cannot clear.
    pub async fn clear(&self) -> Result<()> {
        self.expander.clear().await
    }

    /// Get a reference to the underlying expander.
    pub fn expander(&self) -> &CacheExpander<B> {
        &self.expander
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::book::Book;

    #[test]
    fn test_cache_service_clone() {
        let service1 = CacheService::new(InMemoryBackend::new());
        let service2 = service1.clone();

        // Both services share the same expander
        assert!(Arc::ptr_eq(&service1.expander, &service2.expander));
    }

    #[test]
    fn test_cache_service_with_config() {
        let service = CacheService::with_config(
            InMemoryBackend::new(),
            CacheConfig::default().with_namespace("shelf"),
        )
        .expect("Invalid config");

        assert_eq!(service.expander().id_key::<Book>(&1), "shelf:id:1");
    }

    #[tokio::test]
    async fn test_clones_see_each_others_entries() {
        let service = CacheService::new(InMemoryBackend::new());
        let other = service.clone();
        let key = service.expander().id_key::<Book>(&1);

        service
            .put(&key, || async { Ok(Book::new(1, "Book1", "AuthorX")) })
            .await
            .expect("Failed to put");

        let seen: Option<Book> = other.expander().peek(&key).await.expect("Failed to peek");
        assert!(seen.is_some());

        other.clear().await.expect("Failed to clear");
        assert!(service.expander().backend().is_empty());
    }

    #[tokio::test]
    async fn test_cache_service_thread_safety() {
        let service = CacheService::new(InMemoryBackend::new());
        let mut handles = vec![];

        for i in 0..5 {
            let service_clone = service.clone();
            handles.push(tokio::spawn(async move {
                let key = service_clone.expander().id_key::<Book>(&i);
                let book = service_clone
                    .cacheable(&key, || async move {
                        Ok(Some(Book::new(i, format!("Book{}", i), "AuthorX")))
                    })
                    .await
                    .expect("Failed to execute");
                assert!(book.is_some());
            }));
        }

        for handle in handles {
            handle.await.expect("Task failed");
        }

        assert_eq!(service.expander().backend().len(), 5);
    }
}
