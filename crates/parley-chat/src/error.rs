//! Error types for the conversation controller.

use parley_client::ClientError;
use parley_core::error::ParleyError;
use parley_persist::PersistError;
use parley_store::StoreError;

/// Errors from the conversation controller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// An exchange is already in flight; the new submission was rejected
    /// rather than interleaved.
    #[error("an exchange is already in flight")]
    Busy,

    #[error("store error: {0}")]
    Store(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("request error: {0}")]
    Request(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("internal state error: {0}")]
    Internal(String),
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        ChatError::Store(err.to_string())
    }
}

impl From<PersistError> for ChatError {
    fn from(err: PersistError) -> Self {
        ChatError::Persistence(err.to_string())
    }
}

impl From<ClientError> for ChatError {
    fn from(err: ClientError) -> Self {
        ChatError::Request(err.to_string())
    }
}

impl From<ChatError> for ParleyError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Store(msg) | ChatError::Internal(msg) => ParleyError::Store(msg),
            ChatError::Persistence(msg) => ParleyError::Persistence(msg),
            ChatError::Transcription(msg) => ParleyError::Transcription(msg),
            other => ParleyError::Request(other.to_string()),
        }
    }
}
