//! Cache strategies: how an operation interacts with the cache.
//!
//! Each strategy corresponds to one of the decorators on
//! [`CacheExpander`](crate::CacheExpander):
//!
//! | Strategy | Before the call | After the call |
//! |----------|-----------------|----------------|
//! | **Cacheable** | Return cached value on hit | Cache a present result |
//! | **Put** | - | Always cache the result |
//! | **Evict** | - | Remove the entry (only if the call succeeded) |
//! | **Bypass** | - | - |
//!
//! `Bypass` is what a service method without any caching behaves like. It is kept
//! as an explicit option so the absence of caching is visible at the call site:
//!
//! ```
//! use cache_aside::strategy::CacheStrategy;
//!
//! let read = CacheStrategy::Cacheable;
//! let write = CacheStrategy::Put;
//! let remove = CacheStrategy::Evict;
//! let raw = CacheStrategy::Bypass;
//! assert_ne!(read, raw);
//! # let _ = (write, remove);
//! ```

/// Strategy enum controlling how an operation touches the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CacheStrategy {
    /// Read-through: consult the cache, load and cache on miss.
    ///
    /// Absent results are never cached, so a missing entity is looked up
    /// in the repository every time.
    #[default]
    Cacheable,

    /// Write-through: run the operation and unconditionally cache its result.
    Put,

    /// Run the operation, then evict the entry.
    Evict,

    /// Run the operation without touching the cache.
    Bypass,
}

impl std::fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheStrategy::Cacheable => write!(f, "Cacheable"),
            CacheStrategy::Put => write!(f, "Put"),
            CacheStrategy::Evict => write!(f, "Evict"),
            CacheStrategy::Bypass => write!(f, "Bypass"),
        }
    }
}
