//! Error types for the message store.

use parley_core::error::ParleyError;

/// Errors from the conversation log.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Replace-last was called on an empty log. This is a contract
    /// violation on the caller's side: the operation is only meaningful
    /// immediately after appending a placeholder.
    #[error("cannot replace the last message of an empty conversation")]
    Empty,
}

impl From<StoreError> for ParleyError {
    fn from(err: StoreError) -> Self {
        ParleyError::Store(err.to_string())
    }
}
