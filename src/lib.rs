//! # cache-aside
//!
//! A read-through / write-through cache placed in front of a persistence
//! repository, with the caching behaviour of every operation spelled out at the
//! call site instead of hidden behind annotations.
//!
//! ## Features
//!
//! - **Read-through:** `find_by_id` consults the cache and fills it on a miss
//! - **No negative caching:** absent results always go back to the repository
//! - **Write-through:** `save` caches the stored entity under its id
//! - **Evict on delete:** `delete` drops the id entry after a successful delete
//! - **Explicit opt-outs:** `save_without_caching` and `delete_without_eviction`
//! - **Process-local:** entries live until evicted or cleared; no TTL
//!
//! ## Quick Start
//!
//! ```
//! use cache_aside::{Book, BookService, CacheService, InMemoryRepository};
//! use cache_aside::backend::InMemoryBackend;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> cache_aside::Result<()> {
//! let repo = Arc::new(InMemoryRepository::with_entities([
//!     Book::new(1, "Book1", "AuthorX"),
//! ]));
//! let books: BookService = BookService::new(repo.clone(), CacheService::new(InMemoryBackend::new()));
//!
//! let first = books.find_by_id(&1).await?;
//! let second = books.find_by_id(&1).await?;
//! assert_eq!(first, second);
//! assert_eq!(repo.fetch_by_id_calls(&1), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Lower-level API
//!
//! [`CacheExpander`] exposes the three decorators (`cacheable`, `put`, `evict`)
//! for wrapping arbitrary async operations.

#[macro_use]
extern crate log;

pub mod aside;
pub mod backend;
pub mod book;
pub mod config;
pub mod entity;
pub mod error;
pub mod expander;
pub mod key;
pub mod observability;
pub mod repository;
pub mod serialization;
pub mod service;
pub mod strategy;

// Re-exports for convenience
pub use aside::CacheAsideService;
pub use backend::CacheBackend;
pub use book::{Book, BookService, InMemoryBookRepository};
pub use config::CacheConfig;
pub use entity::CacheEntity;
pub use error::{Error, Result};
pub use expander::CacheExpander;
pub use repository::{DataRepository, InMemoryRepository};
pub use service::CacheService;
pub use strategy::CacheStrategy;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
