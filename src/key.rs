//! Cache key construction.
//!
//! Keys have the shape `"{namespace}:{space}:{value}"`. The id space is `id`;
//! a composite-key space is `lookup.{field}`, so no lookup field (not even one
//! named `id`) can produce a key in the id space. Evicting one space leaves the
//! other untouched.

use crate::entity::CacheEntity;
use std::fmt;

/// Which key space a cache key lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySpace {
    /// Keyed by the entity identifier.
    Id,
    /// Keyed by the primary field of a composite lookup.
    Lookup(&'static str),
}

impl fmt::Display for KeySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpace::Id => write!(f, "id"),
            KeySpace::Lookup(field) => write!(f, "lookup.{}", field),
        }
    }
}

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build a key in the given namespace and space.
    pub fn build(namespace: &str, space: KeySpace, value: &dyn fmt::Display) -> String {
        format!("{}:{}:{}", namespace, space, value)
    }

    /// Key under which an entity is cached by id.
    pub fn for_id<T: CacheEntity>(namespace: &str, id: &T::Key) -> String {
        Self::build(namespace, KeySpace::Id, id)
    }

    /// Key under which a composite lookup is cached. Only `primary` takes part.
    pub fn for_lookup<T: CacheEntity>(namespace: &str, primary: &str) -> String {
        Self::build(namespace, KeySpace::Lookup(T::lookup_field()), &primary)
    }

    /// Split a key into `(namespace, space, value)`.
    ///
    /// The value may itself contain `':'`; only the first two separators count.
    pub fn split(key: &str) -> Option<(&str, &str, &str)> {
        let mut parts = key.splitn(3, ':');
        Some((parts.next()?, parts.next()?, parts.next()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Serialize, Deserialize)]
    struct Track {
        id: i64,
        name: String,
    }

    impl CacheEntity for Track {
        type Key = i64;

        fn cache_key(&self) -> Self::Key {
            self.id
        }

        fn cache_prefix() -> &'static str {
            "track"
        }

        fn lookup_field() -> &'static str {
            "name"
        }
    }

    #[test]
    fn test_id_key() {
        assert_eq!(CacheKeyBuilder::for_id::<Track>("track", &42), "track:id:42");
    }

    #[test]
    fn test_lookup_key_ignores_secondary() {
        assert_eq!(
            CacheKeyBuilder::for_lookup::<Track>("track", "Intro"),
            "track:lookup.name:Intro"
        );
    }

    #[test]
    fn test_key_spaces_do_not_collide() {
        let by_id = CacheKeyBuilder::for_id::<Track>("track", &1);
        let by_name = CacheKeyBuilder::for_lookup::<Track>("track", "1");
        assert_ne!(by_id, by_name);
    }

    #[derive(Clone, Serialize, Deserialize)]
    struct Ticket {
        id: i64,
    }

    impl CacheEntity for Ticket {
        type Key = i64;

        fn cache_key(&self) -> Self::Key {
            self.id
        }

        fn cache_prefix() -> &'static str {
            "ticket"
        }

        fn lookup_field() -> &'static str {
            "id"
        }
    }

    #[test]
    fn test_lookup_field_named_id_stays_out_of_id_space() {
        let by_id = CacheKeyBuilder::for_id::<Ticket>("ticket", &1);
        let by_lookup = CacheKeyBuilder::for_lookup::<Ticket>("ticket", "1");

        assert_eq!(by_id, "ticket:id:1");
        assert_eq!(by_lookup, "ticket:lookup.id:1");
        assert_ne!(by_id, by_lookup);
    }

    #[test]
    fn test_split_keeps_colons_in_value() {
        let key = CacheKeyBuilder::for_lookup::<Track>("track", "Part 1: Dawn");
        assert_eq!(
            CacheKeyBuilder::split(&key),
            Some(("track", "lookup.name", "Part 1: Dawn"))
        );
        assert_eq!(CacheKeyBuilder::split("broken"), None);
    }
}
