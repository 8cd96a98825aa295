//! Core entity trait that all cached entities must implement.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;

/// Trait that all entities stored in the cache must implement.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use cache_aside::CacheEntity;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// pub struct Article {
///     pub id: u64,
///     pub slug: String,
///     pub locale: String,
/// }
///
/// impl CacheEntity for Article {
///     type Key = u64;
///
///     fn cache_key(&self) -> Self::Key {
///         self.id
///     }
///
///     fn cache_prefix() -> &'static str {
///         "article"
///     }
///
///     fn lookup_field() -> &'static str {
///         "slug"
///     }
///
///     fn lookup_fields(&self) -> Option<(&str, &str)> {
///         Some((self.slug.as_str(), self.locale.as_str()))
///     }
/// }
/// ```
pub trait CacheEntity: Send + Sync + Serialize + DeserializeOwned + Clone {
    /// Type of the entity's identifier.
    type Key: Display + Clone + Send + Sync + Eq + Hash + 'static;

    /// Return the entity's identifier. Never changes over the entity's life.
    fn cache_key(&self) -> Self::Key;

    /// Cache name for this entity type, used as the key namespace.
    fn cache_prefix() -> &'static str;

    /// Name of the composite-key space, e.g. `"title"` for books looked up
    /// by title and author.
    fn lookup_field() -> &'static str {
        "lookup"
    }

    /// The (primary, secondary) pair this entity answers to in
    /// `fetch_by_composite_key`. Only the primary part ends up in the cache key.
    ///
    /// Entities without a composite lookup return `None`.
    fn lookup_fields(&self) -> Option<(&str, &str)> {
        None
    }

    /// Serialize entity for cache storage (versioned Postcard envelope).
    fn serialize_for_cache(&self) -> Result<Vec<u8>> {
        crate::serialization::serialize_for_cache(self)
    }

    /// Deserialize entity from cache storage.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCacheEntry`: Bad magic
    /// - `Error::VersionMismatch`: Schema version changed
    /// - `Error::DeserializationError`: Corrupted payload
    fn deserialize_from_cache(bytes: &[u8]) -> Result<Self> {
        crate::serialization::deserialize_from_cache(bytes)
    }

    /// Optional: Validate entity after it is read back from the cache.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Serialize, Deserialize)]
    struct Note {
        id: u32,
        body: String,
    }

    impl CacheEntity for Note {
        type Key = u32;

        fn cache_key(&self) -> Self::Key {
            self.id
        }

        fn cache_prefix() -> &'static str {
            "note"
        }
    }

    #[test]
    fn test_defaults_without_lookup() {
        let note = Note {
            id: 3,
            body: "x".to_string(),
        };

        assert_eq!(note.cache_key(), 3);
        assert_eq!(Note::cache_prefix(), "note");
        assert_eq!(Note::lookup_field(), "lookup");
        assert!(note.lookup_fields().is_none());
        assert!(note.validate().is_ok());
    }

    #[test]
    fn test_cache_roundtrip_through_trait() {
        let note = Note {
            id: 9,
            body: "cached".to_string(),
        };

        let bytes = note.serialize_for_cache().unwrap();
        let back = Note::deserialize_from_cache(&bytes).unwrap();
        assert_eq!(back.id, 9);
        assert_eq!(back.body, "cached");
    }
}
