//! Error types for the cache-aside layer.

use crate::strategy::CacheStrategy;
use std::fmt;

/// Result type for cache-aside operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the cache-aside layer.
///
/// A missing entity is never an error: lookups return `Ok(None)` for that.
/// Everything below is a genuine failure of the cache, the store, or the caller.
#[derive(Debug, Clone)]
pub enum Error {
    /// Entity could not be encoded into a cache envelope.
    SerializationError(String),

    /// Cached bytes could not be decoded back into an entity.
    ///
    /// The read path drops such entries and reloads from the repository,
    /// so callers normally only see this from the serialization helpers.
    DeserializationError(String),

    /// Entity validation failed after it was read from the cache.
    ValidationError(String),

    /// Cache backend failure.
    BackendError(String),

    /// Data repository failure (database, network, etc).
    ///
    /// Propagated unchanged; the cache is never touched when the repository fails.
    RepositoryError(String),

    /// Invalid cache configuration.
    ConfigError(String),

    /// Optional repository/backend operation that the implementation does not provide.
    NotImplemented(String),

    /// Cache envelope carried the wrong magic header.
    InvalidCacheEntry(String),

    /// Cache envelope was written by a different schema version.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// A strategy was requested for an operation that cannot honour it,
    /// e.g. `Evict` on a save.
    UnsupportedStrategy {
        operation: &'static str,
        strategy: CacheStrategy,
    },

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::UnsupportedStrategy {
                operation,
                strategy,
            } => write!(f, "Strategy {} is not supported for {}", strategy, operation),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for errors that mean "this cache entry is unusable" rather than
    /// "the cache is broken". The read path recovers from these by reloading.
    pub fn is_corrupt_entry(&self) -> bool {
        matches!(
            self,
            Error::DeserializationError(_)
                | Error::InvalidCacheEntry(_)
                | Error::VersionMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::ConfigError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RepositoryError("connection refused".to_string());
        assert_eq!(err.to_string(), "Repository error: connection refused");
    }

    #[test]
    fn test_unsupported_strategy_display() {
        let err = Error::UnsupportedStrategy {
            operation: "save",
            strategy: CacheStrategy::Evict,
        };
        assert_eq!(err.to_string(), "Strategy Evict is not supported for save");
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_error_from_json() {
        let err: Error = serde_json::from_str::<u32>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_corrupt_entry_classification() {
        assert!(Error::InvalidCacheEntry("bad".into()).is_corrupt_entry());
        assert!(Error::VersionMismatch {
            expected: 1,
            found: 2
        }
        .is_corrupt_entry());
        assert!(!Error::BackendError("down".into()).is_corrupt_entry());
    }
}
