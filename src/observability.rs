//! Metrics hooks for cache operations.
//!
//! Implement [`CacheMetrics`] to forward cache events to a monitoring system.
//! The default for a new expander is [`NoOpMetrics`]; [`CounterMetrics`] keeps
//! in-process counters and is handy in tests:
//!
//! ```
//! use cache_aside::observability::{CacheMetrics, CounterMetrics};
//! use std::time::Duration;
//!
//! let metrics = CounterMetrics::new();
//! metrics.record_hit("book:id:1", Duration::from_micros(3));
//! metrics.record_miss("book:id:2", Duration::from_micros(5));
//!
//! let stats = metrics.snapshot();
//! assert_eq!(stats.hits, 1);
//! assert_eq!(stats.hit_ratio(), 0.5);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Trait for cache metrics collection.
pub trait CacheMetrics: Send + Sync {
    /// Record a cache hit.
    fn record_hit(&self, key: &str, duration: Duration) {
        debug!("Cache HIT: {} took {:?}", key, duration);
    }

    /// Record a cache miss.
    fn record_miss(&self, key: &str, duration: Duration) {
        debug!("Cache MISS: {} took {:?}", key, duration);
    }

    /// Record a value written into the cache.
    fn record_put(&self, key: &str, duration: Duration) {
        debug!("Cache PUT: {} took {:?}", key, duration);
    }

    /// Record an explicit eviction.
    fn record_evict(&self, key: &str) {
        debug!("Cache EVICT: {}", key);
    }

    /// Record an error.
    fn record_error(&self, key: &str, error: &str) {
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {}
    fn record_miss(&self, _key: &str, _duration: Duration) {}
    fn record_put(&self, _key: &str, _duration: Duration) {}
    fn record_evict(&self, _key: &str) {}
    fn record_error(&self, _key: &str, _error: &str) {}
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    evictions: AtomicU64,
    errors: AtomicU64,
}

/// Metrics implementation backed by atomic counters.
///
/// Clones share the same counters, so one clone can be handed to the expander
/// and another kept for reading.
#[derive(Clone, Default)]
pub struct CounterMetrics {
    counters: Arc<Counters>,
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter values.
    pub fn snapshot(&self) -> CacheStats {
        let c = &self.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            puts: c.puts.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
            errors: c.errors.load(Ordering::Relaxed),
        }
    }
}

impl CacheMetrics for CounterMetrics {
    fn record_hit(&self, _key: &str, _duration: Duration) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self, _key: &str, _duration: Duration) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_put(&self, _key: &str, _duration: Duration) {
        self.counters.puts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_evict(&self, _key: &str) {
        self.counters.evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self, key: &str, error: &str) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
        warn!("Cache ERROR for {}: {}", key, error);
    }
}

/// Point-in-time view of [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub puts: u64,
    pub evictions: u64,
    pub errors: u64,
}

impl CacheStats {
    /// Fraction of reads served from the cache; 0.0 before any read.
    pub fn hit_ratio(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }
}
