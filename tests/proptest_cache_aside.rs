//! Property-based tests for the cache-aside contract.
//!
//! # Properties Tested
//!
//! 1. **Single load**: any number of lookups of a present id query the repository once
//! 2. **No negative caching**: every lookup of an absent id queries the repository
//! 3. **Write-through**: a saved book is always served without a repository query
//! 4. **Envelope**: any book survives the cache encoding and carries magic + version
//! 5. **Corruption**: bytes without the envelope never decode

use cache_aside::backend::InMemoryBackend;
use cache_aside::serialization::{CACHE_MAGIC, CURRENT_SCHEMA_VERSION};
use cache_aside::{Book, BookService, CacheEntity, CacheService, InMemoryRepository};
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime")
}

/// Generate arbitrary Book, titles and authors in any script
fn arb_book() -> impl Strategy<Value = Book> {
    (any::<i64>(), any::<String>(), any::<String>())
        .prop_map(|(id, title, author)| Book::new(id, title, author))
}

fn service_with(books: Vec<Book>) -> (BookService, Arc<InMemoryRepository<Book>>) {
    let repo = Arc::new(InMemoryRepository::with_entities(books));
    let service = BookService::new(repo.clone(), CacheService::new(InMemoryBackend::new()));
    (service, repo)
}

proptest! {
    /// Property: N lookups of a stored id cost exactly one repository query
    #[test]
    fn prop_present_id_loaded_once(book in arb_book(), lookups in 1usize..20) {
        let (service, repo) = service_with(vec![book.clone()]);

        runtime().block_on(async {
            for _ in 0..lookups {
                let found = service.find_by_id(&book.id).await.expect("Lookup should succeed");
                assert_eq!(found.as_ref(), Some(&book));
            }
        });

        prop_assert_eq!(repo.fetch_by_id_calls(&book.id), 1);
    }

    /// Property: N lookups of a missing id cost N repository queries
    #[test]
    fn prop_absent_id_never_cached(id in any::<i64>(), lookups in 1usize..20) {
        let (service, repo) = service_with(vec![]);

        runtime().block_on(async {
            for _ in 0..lookups {
                let found = service.find_by_id(&id).await.expect("Lookup should succeed");
                assert!(found.is_none());
            }
        });

        prop_assert_eq!(repo.fetch_by_id_calls(&id), lookups);
        prop_assert!(service.cache().expander().backend().is_empty());
    }

    /// Property: after save, lookups by id never reach the repository
    #[test]
    fn prop_saved_book_served_from_cache(book in arb_book(), lookups in 1usize..10) {
        let (service, repo) = service_with(vec![]);

        runtime().block_on(async {
            service.save(&book).await.expect("Save should succeed");
            for _ in 0..lookups {
                let found = service.find_by_id(&book.id).await.expect("Lookup should succeed");
                assert_eq!(found.as_ref(), Some(&book));
            }
        });

        prop_assert_eq!(repo.fetch_by_id_calls(&book.id), 0);
    }

    /// Property: after delete, the next lookup goes to the repository
    #[test]
    fn prop_delete_forces_reload(book in arb_book()) {
        let (service, repo) = service_with(vec![book.clone()]);

        runtime().block_on(async {
            service.find_by_id(&book.id).await.expect("Lookup should succeed");
            service.delete(&book).await.expect("Delete should succeed");
            let found = service.find_by_id(&book.id).await.expect("Lookup should succeed");
            assert!(found.is_none());
        });

        prop_assert_eq!(repo.fetch_by_id_calls(&book.id), 2);
    }
}

proptest! {
    /// Property: any Book survives the cache encoding
    #[test]
    fn prop_book_envelope_roundtrip(book in arb_book()) {
        let bytes = book.serialize_for_cache().expect("Serialization should succeed");

        prop_assert_eq!(&bytes[0..4], &CACHE_MAGIC[..]);
        // Varint version; fits in one byte while below 128
        prop_assert_eq!(u32::from(bytes[4]), CURRENT_SCHEMA_VERSION);

        let decoded = Book::deserialize_from_cache(&bytes).expect("Deserialization should succeed");
        prop_assert_eq!(book, decoded);
    }

    /// Property: bytes that do not start with the magic header are rejected
    #[test]
    fn prop_foreign_bytes_rejected(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        prop_assume!(bytes.len() < 4 || bytes[0..4] != CACHE_MAGIC[..]);

        prop_assert!(Book::deserialize_from_cache(&bytes).is_err());
    }
}
