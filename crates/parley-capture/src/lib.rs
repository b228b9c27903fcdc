//! Recorder event handling for voice input.
//!
//! Device capture produces a bounded event stream: zero or more chunk
//! events followed by a single stop event. This crate assembles that stream
//! into one audio clip per recording session, decoupled from the
//! conversation core. The actual microphone plumbing lives in the caller.

use chrono::{DateTime, Utc};

use parley_core::error::ParleyError;

/// Container format produced by the recorder.
pub const WEBM_MIME: &str = "audio/webm";

// =============================================================================
// Errors
// =============================================================================

/// Errors from clip assembly.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// An event arrived after the session's stop event.
    #[error("recording session is already closed")]
    SessionClosed,

    /// The accumulated chunks exceeded the configured bound.
    #[error("clip too large: {size} bytes exceeds {limit} bytes")]
    ClipTooLarge { size: usize, limit: usize },

    /// The session stopped without capturing any audio.
    #[error("recording session produced no audio")]
    EmptyClip,
}

impl From<CaptureError> for ParleyError {
    fn from(err: CaptureError) -> Self {
        ParleyError::Capture(err.to_string())
    }
}

// =============================================================================
// Types
// =============================================================================

/// One event emitted by the recording device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A chunk of encoded audio bytes.
    Chunk(Vec<u8>),
    /// The recording stopped; no further chunks follow.
    Stop,
}

/// One assembled recording, ready for transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Encoded audio bytes in the container named by `mime`.
    pub data: Vec<u8>,
    /// MIME type of `data`.
    pub mime: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

impl AudioClip {
    /// Wrap already-assembled webm bytes (e.g., a file picked from disk).
    pub fn webm(data: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            data,
            mime: WEBM_MIME.to_string(),
            started_at: now,
            stopped_at: now,
        }
    }
}

// =============================================================================
// ClipAssembler
// =============================================================================

/// Consumes recorder events and produces one clip per session.
///
/// Chunks accumulate in arrival order. The stop event yields the assembled
/// clip and closes the session; any event after that is an error. The total
/// byte count is bounded so a runaway recorder cannot grow without limit.
#[derive(Debug)]
pub struct ClipAssembler {
    data: Vec<u8>,
    max_bytes: usize,
    started_at: DateTime<Utc>,
    closed: bool,
}

impl ClipAssembler {
    /// Start a new recording session bounded to `max_bytes` of audio.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            data: Vec::new(),
            max_bytes,
            started_at: Utc::now(),
            closed: false,
        }
    }

    /// Feed one recorder event into the session.
    ///
    /// Returns `Ok(Some(clip))` exactly once, on the stop event; chunk
    /// events return `Ok(None)` while the session accumulates.
    pub fn push(&mut self, event: RecorderEvent) -> Result<Option<AudioClip>, CaptureError> {
        if self.closed {
            return Err(CaptureError::SessionClosed);
        }

        match event {
            RecorderEvent::Chunk(bytes) => {
                let size = self.data.len() + bytes.len();
                if size > self.max_bytes {
                    self.closed = true;
                    return Err(CaptureError::ClipTooLarge {
                        size,
                        limit: self.max_bytes,
                    });
                }
                self.data.extend_from_slice(&bytes);
                Ok(None)
            }
            RecorderEvent::Stop => {
                self.closed = true;
                if self.data.is_empty() {
                    return Err(CaptureError::EmptyClip);
                }
                let clip = AudioClip {
                    data: std::mem::take(&mut self.data),
                    mime: WEBM_MIME.to_string(),
                    started_at: self.started_at,
                    stopped_at: Utc::now(),
                };
                tracing::debug!(bytes = clip.data.len(), "Recording assembled");
                Ok(Some(clip))
            }
        }
    }

    /// Whether the session has seen its stop event (or aborted on a bound).
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
