//! Error types for the persistence bridge.

use parley_core::error::ParleyError;

/// Errors from snapshot storage and the history bridge.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Persisted data exists but cannot be decoded. Recoverable: callers
    /// fall back to an empty conversation.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PersistError> for ParleyError {
    fn from(err: PersistError) -> Self {
        ParleyError::Persistence(err.to_string())
    }
}
