//! Error types for the remote service clients.

use parley_core::error::ParleyError;

/// Errors from the query and transcription clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The endpoint answered, but the body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    BadResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::RequestFailed(err.to_string())
    }
}

impl From<ClientError> for ParleyError {
    fn from(err: ClientError) -> Self {
        ParleyError::Request(err.to_string())
    }
}
