//! Client for the remote transcription service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use parley_capture::AudioClip;

use crate::error::ClientError;

/// Turns a recorded audio clip into recognized text.
#[async_trait]
pub trait TranscriptionClient: Send + Sync {
    /// Upload the clip and return the recognized text.
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, ClientError>;
}

/// Expected response body of the transcription endpoint.
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    query: String,
}

/// HTTP implementation uploading the clip as a multipart file field.
pub struct HttpTranscriptionClient {
    client: reqwest::Client,
    url: String,
}

impl HttpTranscriptionClient {
    /// Build a client for `url` with a per-request timeout.
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
impl TranscriptionClient for HttpTranscriptionClient {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, ClientError> {
        let file_part = multipart::Part::bytes(clip.data.clone())
            .file_name("voice.webm")
            .mime_str(&clip.mime)
            .map_err(|e| ClientError::RequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new().part("file", file_part);

        tracing::debug!(url = %self.url, bytes = clip.data.len(), "Uploading clip");

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

        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| ClientError::BadResponse(format!("body: {}", e)))?;

        tracing::debug!(chars = body.query.len(), "Clip transcribed");

        Ok(body.query)
    }
}
