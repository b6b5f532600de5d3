//! Store configuration.

use crate::error::Error;
use std::path::PathBuf;

/// Scheme for an on-disk sled store.
pub const SLED_SCHEME: &str = "sled://";

/// Connection string for a temporary store that is discarded when closed.
pub const MEMORY_URL: &str = "sled::memory:";

/// Configuration for the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path to the database directory.
    pub path: PathBuf,

    /// Page cache capacity in bytes.
    pub cache_capacity: u64,

    /// Flush interval in milliseconds. None means flush only when asked.
    pub flush_every_ms: Option<u64>,

    /// Enable zstd compression.
    pub compression: bool,

    /// Temporary database (deleted on drop).
    pub temporary: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./donorbase_data"),
            cache_capacity: 256 * 1024 * 1024, // 256MB
            flush_every_ms: Some(1000),
            compression: true,
            temporary: false,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Create a temporary configuration for testing.
    pub fn temporary() -> Self {
        Self {
            path: PathBuf::from(""),
            temporary: true,
            ..Default::default()
        }
    }

    /// Parse a connection string.
    ///
    /// Accepted forms:
    /// - `sled://<path>`: on-disk store at `path`
    /// - `sled::memory:`: temporary store
    /// - a bare filesystem path
    pub fn from_connection_string(url: &str) -> Result<Self, Error> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::Config("connection string is empty".to_string()));
        }

        if url == MEMORY_URL {
            return Ok(Self::temporary());
        }

        if let Some(path) = url.strip_prefix(SLED_SCHEME) {
            if path.is_empty() {
                return Err(Error::Config(format!("no path in connection string '{url}'")));
            }
            return Ok(Self::new(path));
        }

        if let Some((scheme, _)) = url.split_once("://") {
            return Err(Error::Config(format!(
                "unsupported connection scheme '{scheme}'"
            )));
        }

        Ok(Self::new(url))
    }

    /// Set the cache capacity.
    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Set the flush interval.
    pub fn with_flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    /// Convert to sled configuration.
    pub(crate) fn to_sled_config(&self) -> sled::Config {
        let mut config = sled::Config::new()
            .cache_capacity(self.cache_capacity)
            .use_compression(self.compression)
            .flush_every_ms(self.flush_every_ms);

        if self.temporary {
            config = config.temporary(true);
        } else {
            config = config.path(&self.path);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sled_scheme() {
        let config = StoreConfig::from_connection_string("sled:///var/lib/donorbase").unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/donorbase"));
        assert!(!config.temporary);
    }

    #[test]
    fn test_memory_url() {
        let config = StoreConfig::from_connection_string(MEMORY_URL).unwrap();
        assert!(config.temporary);
    }

    #[test]
    fn test_bare_path() {
        let config = StoreConfig::from_connection_string(" ./data/donors ").unwrap();
        assert_eq!(config.path, PathBuf::from("./data/donors"));
    }

    #[test]
    fn test_rejects_bad_strings() {
        assert!(matches!(
            StoreConfig::from_connection_string(""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            StoreConfig::from_connection_string("sled://"),
            Err(Error::Config(_))
        ));
        let err = StoreConfig::from_connection_string("mongodb://localhost:27017").unwrap_err();
        assert!(err.to_string().contains("mongodb"));
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new("/tmp/x")
            .with_cache_capacity(1024)
            .with_flush_every_ms(None);
        assert_eq!(config.cache_capacity, 1024);
        assert_eq!(config.flush_every_ms, None);
    }
}
