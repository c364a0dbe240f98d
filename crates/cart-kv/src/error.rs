//! Storage error types.

use thiserror::Error;

/// Errors that can occur when talking to a key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    Open(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or decode a value.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store rejected the operation.
    #[error("Store operation failed: {0}")]
    Store(String),
}
