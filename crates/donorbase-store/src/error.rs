//! Store error types.

use donorbase_core::StoreError;
use thiserror::Error;

/// Document store errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key decoding error.
    #[error("invalid key format")]
    InvalidKey,

    /// Document not found.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Document body is not what the operation expects.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Document id could not be parsed.
    #[error("invalid document id: {0}")]
    InvalidId(String),

    /// Bad connection string or store configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(id) => StoreError::NotFound(id),
            Error::InvalidId(id) => StoreError::InvalidId(id),
            Error::InvalidDocument(reason) => StoreError::InvalidDocument {
                id: String::new(),
                reason,
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}
