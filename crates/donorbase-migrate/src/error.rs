//! Command-line error types.

use thiserror::Error;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] donorbase_store::Error),

    /// Migration run error.
    #[error("migration error: {0}")]
    Migration(#[from] donorbase_core::Error),

    /// Output encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
