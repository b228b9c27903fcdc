//! Scripted client mocks for testing without a live server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use parley_capture::AudioClip;

use crate::error::ClientError;
use crate::query::QueryClient;
use crate::transcribe::TranscriptionClient;

#[derive(Debug, Clone)]
enum Outcome {
    Respond(String),
    Fail(String),
}

impl Outcome {
    fn resolve(&self) -> Result<String, ClientError> {
        match self {
            Outcome::Respond(text) => Ok(text.clone()),
            Outcome::Fail(reason) => Err(ClientError::RequestFailed(reason.clone())),
        }
    }
}

/// Mock query client with a fixed scripted outcome and a call counter.
///
/// The optional gate lets a test hold a request in flight: `query` parks on
/// the gate until the test calls `notify_one`.
pub struct MockQueryClient {
    outcome: Outcome,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockQueryClient {
    /// Always answer with `answer`.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Respond(answer.into()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Always fail with a request error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail(reason.into()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Answer with `answer`, but only after the returned gate is notified.
    pub fn gated(answer: impl Into<String>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let client = Self {
            outcome: Outcome::Respond(answer.into()),
            calls: AtomicUsize::new(0),
            gate: Some(Arc::clone(&gate)),
        };
        (client, gate)
    }

    /// How many times `query` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryClient for MockQueryClient {
    async fn query(&self, _message: &str) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.resolve()
    }
}

/// Mock transcription client with a fixed scripted outcome.
pub struct MockTranscriptionClient {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl MockTranscriptionClient {
    /// Always recognize the clip as `text`.
    pub fn recognizing(text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Respond(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with a request error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `transcribe` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionClient for MockTranscriptionClient {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<String, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.resolve()
    }
}
