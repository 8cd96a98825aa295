//! Versioned cache envelopes encoded with Postcard.
//!
//! Every cached entity is stored as:
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (varint) │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//!   "CSAD"              u32                postcard(T)
//! ```
//!
//! Decoding checks the magic and the schema version before the payload is
//! trusted. The read path in [`CacheExpander`](crate::CacheExpander) treats any
//! decoding failure as a miss and drops the entry.
//!
//! ```rust
//! use cache_aside::serialization::{deserialize_from_cache, serialize_for_cache};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Book {
//!     id: i64,
//!     title: String,
//! }
//!
//! # fn main() -> cache_aside::Result<()> {
//! let book = Book { id: 1, title: "Book1".to_string() };
//! let bytes = serialize_for_cache(&book)?;
//! let back: Book = deserialize_from_cache(&bytes)?;
//! assert_eq!(book, back);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header of every cache entry.
pub const CACHE_MAGIC: [u8; 4] = *b"CSAD";

/// Current schema version.
///
/// Bump when a cached type changes shape. Entries written by another version
/// are rejected on read and reloaded from the repository.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Envelope wrapped around every cached payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheEnvelope<T> {
    pub magic: [u8; 4],
    pub version: u32,
    pub payload: T,
}

impl<T> CacheEnvelope<T> {
    /// Wrap a payload with the current magic and version.
    pub fn new(payload: T) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: CURRENT_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Encode a value for cache storage.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard encoding fails.
pub fn serialize_for_cache<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    postcard::to_allocvec(&CacheEnvelope::new(value)).map_err(|e| {
        error!("Cache serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode a value from cache storage.
///
/// # Errors
///
/// - `Error::DeserializationError`: the bytes are not a valid envelope
/// - `Error::InvalidCacheEntry`: wrong magic header
/// - `Error::VersionMismatch`: entry written by another schema version
pub fn deserialize_from_cache<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: CacheEnvelope<T> = postcard::from_bytes(bytes)
        .map_err(|e| Error::DeserializationError(e.to_string()))?;

    if envelope.magic != CACHE_MAGIC {
        return Err(Error::InvalidCacheEntry(format!(
            "Invalid magic: expected {:?}, got {:?}",
            CACHE_MAGIC, envelope.magic
        )));
    }

    if envelope.version != CURRENT_SCHEMA_VERSION {
        return Err(Error::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
