//! Cache configuration.
//!
//! ```
//! use cache_aside::CacheConfig;
//!
//! let config = CacheConfig::from_json(r#"{ "namespace": "library" }"#).unwrap();
//! assert!(config.enabled);
//! assert_eq!(config.namespace.as_deref(), Some("library"));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Settings shared by every operation of a [`CacheExpander`](crate::CacheExpander).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When `false`, every decorated operation goes straight to the repository
    /// and the cache is neither read nor written.
    pub enabled: bool,

    /// Cache name. Defaults to the entity's `cache_prefix()`.
    pub namespace: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            namespace: None,
        }
    }
}

impl CacheConfig {
    /// Configuration with caching switched off.
    pub fn disabled() -> Self {
        CacheConfig {
            enabled: false,
            ..Self::default()
        }
    }

    /// Override the cache name.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for malformed JSON or an invalid namespace.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CacheConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that would produce ambiguous keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the namespace is empty or contains `':'`.
    pub fn validate(&self) -> Result<()> {
        match self.namespace.as_deref() {
            Some("") => Err(Error::ConfigError("namespace must not be empty".into())),
            Some(ns) if ns.contains(':') => Err(Error::ConfigError(format!(
                "namespace must not contain ':' (got {})",
                ns
            ))),
            _ => Ok(()),
        }
    }

    /// Namespace to use for an entity whose prefix is `prefix`.
    pub fn namespace_or<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(prefix)
    }
}
