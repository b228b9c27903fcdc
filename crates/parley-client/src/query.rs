//! Client for the remote query service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::error::ClientError;

/// Answers a user message with markdown text.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Send the raw user text and return the service's markdown answer.
    async fn query(&self, message: &str) -> Result<String, ClientError>;
}

/// Expected response body of the query endpoint.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    answer: String,
}

/// HTTP implementation posting a multipart form to the query endpoint.
pub struct HttpQueryClient {
    client: reqwest::Client,
    url: String,
}

impl HttpQueryClient {
    /// Build a client for `url` with a per-request timeout.
    ///
    /// The timeout keeps a stalled remote from stranding a pending
    /// exchange indefinitely.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::RequestFailed(format!("client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn query(&self, message: &str) -> Result<String, ClientError> {
        let form = multipart::Form::new().text("message", message.to_string());

        tracing::debug!(url = %self.url, chars = message.len(), "Sending query");

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ClientError::RequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| ClientError::BadResponse(format!("body: {}", e)))?;

        tracing::debug!(chars = body.answer.len(), "Query answered");

        Ok(body.answer)
    }
}
