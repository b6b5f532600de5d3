//! Core error types.

use thiserror::Error;

/// Errors that abort a migration run before or outside the per-record loop.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration (e.g. no connection string).
    #[error("configuration error: {0}")]
    Config(String),

    /// The record store failed while loading the eligible set.
    #[error("record store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by a [`RecordStore`](crate::RecordStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The record addressed by an update does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A stored document does not have the expected shape.
    #[error("invalid document {id}: {reason}")]
    InvalidDocument {
        /// Identifier of the offending document.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The identifier could not be interpreted by the store.
    #[error("invalid record id: {0}")]
    InvalidId(String),

    /// Backend failure (I/O, encoding, ...).
    #[error("backend error: {0}")]
    Backend(String),
}
