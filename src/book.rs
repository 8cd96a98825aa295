//! `Book`, the entity the cache-aside service is demonstrated on.

use crate::aside::CacheAsideService;
use crate::backend::InMemoryBackend;
use crate::entity::CacheEntity;
use crate::repository::InMemoryRepository;
use serde::{Deserialize, Serialize};

/// A book. `id` is the identity; title and author change only by full replacement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
}

impl Book {
    pub fn new(id: i64, title: impl Into<String>, author: impl Into<String>) -> Self {
        Book {
            id,
            title: title.into(),
            author: author.into(),
        }
    }
}

impl CacheEntity for Book {
    type Key = i64;

    fn cache_key(&self) -> Self::Key {
        self.id
    }

    fn cache_prefix() -> &'static str {
        "book"
    }

    fn lookup_field() -> &'static str {
        "title"
    }

    fn lookup_fields(&self) -> Option<(&str, &str)> {
        Some((self.title.as_str(), self.author.as_str()))
    }
}

/// In-memory book store.
pub type InMemoryBookRepository = InMemoryRepository<Book>;

/// Cache-aside service for books. Composite lookups are by (title, author),
/// cached by title alone.
pub type BookService<R = InMemoryBookRepository, B = InMemoryBackend> =
    CacheAsideService<Book, R, B>;
