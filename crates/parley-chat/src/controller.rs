//! The conversation controller: state machine for user-initiated exchanges.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use uuid::Uuid;

use parley_capture::AudioClip;
use parley_client::{QueryClient, TranscriptionClient};
use parley_persist::HistoryBridge;
use parley_store::{ConversationLog, Message};

use crate::error::ChatError;
use crate::render::render_markdown;

/// Placeholder markup shown while an answer is pending.
pub const TYPING_INDICATOR: &str =
    r#"<div class="typing-indicator"><span></span><span></span><span></span></div>"#;

/// User entry recorded when a voice recording is submitted, before the
/// recognized text arrives.
pub const VOICE_MARKER: &str = "🎤 [Voice Input]";

/// Notice replacing the placeholder when the query service fails.
const QUERY_FAILED_NOTICE: &str =
    "Sorry, I couldn't fetch an answer right now. Please try again.";

/// Notice replacing the placeholder when transcription fails.
const TRANSCRIBE_FAILED_NOTICE: &str =
    "Sorry, I couldn't understand the recording. Please try again.";

/// Phase of the exchange state machine.
///
/// `Idle` between exchanges; `Submitted` once the optimistic entries are
/// appended; `AwaitingResponse` while a request is in flight. Success and
/// failure both resolve back to `Idle` after the placeholder is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Idle,
    Submitted,
    AwaitingResponse,
}

/// Orchestrates exchanges between the conversation log and the remote
/// services.
///
/// At most one exchange is in flight at a time: a submission while another
/// is pending is rejected with [`ChatError::Busy`] so interleaved
/// replace-last operations can never corrupt the placeholder semantics.
/// Every log mutation is written through the history bridge before the
/// mutating call returns.
pub struct ChatController {
    log: Mutex<ConversationLog>,
    history: HistoryBridge,
    query: Arc<dyn QueryClient>,
    transcriber: Arc<dyn TranscriptionClient>,
    phase: Mutex<ExchangePhase>,
}

impl ChatController {
    /// Build a controller, restoring the persisted conversation.
    ///
    /// A missing snapshot starts an empty conversation; a corrupt one is
    /// logged and discarded. No load failure escapes to the caller.
    pub fn new(
        history: HistoryBridge,
        query: Arc<dyn QueryClient>,
        transcriber: Arc<dyn TranscriptionClient>,
    ) -> Self {
        let messages = match history.load() {
            Ok(messages) => messages,
            Err(e) => {
                warn!(key = %history.key(), error = %e, "Discarding unreadable history");
                Vec::new()
            }
        };
        info!(count = messages.len(), "Conversation restored");

        Self {
            log: Mutex::new(ConversationLog::from_snapshot(messages)),
            history,
            query,
            transcriber,
            phase: Mutex::new(ExchangePhase::Idle),
        }
    }

    /// Submit typed text.
    ///
    /// Whitespace-only input is silently ignored: no store mutation, no
    /// network call. Otherwise the user entry and a typing-indicator
    /// placeholder are appended, the query service is called with the raw
    /// text, and the placeholder is rewritten with the rendered answer or
    /// a failure notice.
    pub async fn send_text(&self, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return Ok(());
        }

        let guard = self.begin_exchange()?;
        let exchange = Uuid::new_v4();
        info!(%exchange, chars = text.len(), "Text exchange started");

        self.mutate(|log| {
            log.append(Message::user(text));
            log.append(Message::bot_markup(TYPING_INDICATOR));
            Ok(())
        })?;

        let result = self.resolve_query(text).await;
        drop(guard);
        match &result {
            Ok(()) => info!(%exchange, "Text exchange resolved"),
            Err(e) => warn!(%exchange, error = %e, "Text exchange failed"),
        }
        result
    }

    /// Submit a recorded voice clip.
    ///
    /// The voice marker and a placeholder are appended first. On a
    /// transcription failure the placeholder is rewritten with a failure
    /// notice and the query service is never called. On success the
    /// placeholder is rewritten as the recognized user text and the same
    /// query flow as [`ChatController::send_text`] runs.
    pub async fn send_voice(&self, clip: &AudioClip) -> Result<(), ChatError> {
        let guard = self.begin_exchange()?;
        let exchange = Uuid::new_v4();
        info!(%exchange, bytes = clip.data.len(), "Voice exchange started");

        self.mutate(|log| {
            log.append(Message::user(VOICE_MARKER));
            log.append(Message::bot_markup(TYPING_INDICATOR));
            Ok(())
        })?;

        self.set_phase(ExchangePhase::AwaitingResponse)?;
        let recognized = match self.transcriber.transcribe(clip).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                self.mutate(|log| {
                    log.replace_last(Message::bot(TRANSCRIBE_FAILED_NOTICE))
                        .map_err(Into::into)
                })?;
                warn!(%exchange, "Transcription returned no text");
                return Err(ChatError::Transcription("empty transcription".to_string()));
            }
            Err(e) => {
                self.mutate(|log| {
                    log.replace_last(Message::bot(TRANSCRIBE_FAILED_NOTICE))
                        .map_err(Into::into)
                })?;
                warn!(%exchange, error = %e, "Transcription failed");
                return Err(ChatError::Transcription(e.to_string()));
            }
        };

        // The placeholder becomes the recognized user entry; a fresh
        // placeholder takes its place for the query stage.
        self.mutate(|log| {
            log.replace_last(Message::user(recognized.clone()))?;
            log.append(Message::bot_markup(TYPING_INDICATOR));
            Ok(())
        })?;

        let result = self.resolve_query(&recognized).await;
        drop(guard);
        match &result {
            Ok(()) => info!(%exchange, "Voice exchange resolved"),
            Err(e) => warn!(%exchange, error = %e, "Voice exchange failed"),
        }
        result
    }

    /// Reset the conversation and drop the persisted snapshot.
    pub fn clear(&self) -> Result<(), ChatError> {
        let _guard = self.begin_exchange()?;
        let mut log = self
            .log
            .lock()
            .map_err(|e| ChatError::Internal(format!("log lock poisoned: {}", e)))?;
        log.clear();
        if let Err(e) = self.history.reset() {
            warn!(key = %self.history.key(), error = %e, "History reset failed; continuing");
        }
        Ok(())
    }

    /// Full ordered copy of the conversation for rendering.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log
            .lock()
            .map(|log| log.snapshot())
            .unwrap_or_default()
    }

    /// Current phase of the exchange state machine.
    pub fn phase(&self) -> ExchangePhase {
        self.phase
            .lock()
            .map(|p| *p)
            .unwrap_or(ExchangePhase::Idle)
    }

    /// Issue the query and rewrite the placeholder with the outcome.
    async fn resolve_query(&self, message: &str) -> Result<(), ChatError> {
        self.set_phase(ExchangePhase::AwaitingResponse)?;
        match self.query.query(message).await {
            Ok(answer) => {
                let markup = render_markdown(&answer);
                self.mutate(|log| {
                    log.replace_last(Message::bot_markup(markup)).map_err(Into::into)
                })
            }
            Err(e) => {
                // The failure must be visible in the conversation; a stuck
                // typing indicator is never left behind.
                self.mutate(|log| {
                    log.replace_last(Message::bot(QUERY_FAILED_NOTICE))
                        .map_err(Into::into)
                })?;
                Err(e.into())
            }
        }
    }

    /// Claim the single exchange slot, or reject with `Busy`.
    fn begin_exchange(&self) -> Result<ExchangeGuard<'_>, ChatError> {
        let mut phase = self.lock_phase()?;
        if *phase != ExchangePhase::Idle {
            return Err(ChatError::Busy);
        }
        *phase = ExchangePhase::Submitted;
        Ok(ExchangeGuard { phase: &self.phase })
    }

    fn set_phase(&self, next: ExchangePhase) -> Result<(), ChatError> {
        *self.lock_phase()? = next;
        Ok(())
    }

    fn lock_phase(&self) -> Result<MutexGuard<'_, ExchangePhase>, ChatError> {
        self.phase
            .lock()
            .map_err(|e| ChatError::Internal(format!("phase lock poisoned: {}", e)))
    }

    /// Apply a mutation to the log and write the new snapshot through.
    ///
    /// If the mutation itself fails nothing is persisted. A failed save is
    /// logged and the exchange continues: the in-memory log stays
    /// authoritative and the next successful save catches the durable copy
    /// up, so a storage fault can never strand a typing indicator.
    fn mutate<F>(&self, f: F) -> Result<(), ChatError>
    where
        F: FnOnce(&mut ConversationLog) -> Result<(), ChatError>,
    {
        let mut log = self
            .log
            .lock()
            .map_err(|e| ChatError::Internal(format!("log lock poisoned: {}", e)))?;
        f(&mut log)?;
        if let Err(e) = self.history.save(&log.snapshot()) {
            warn!(key = %self.history.key(), error = %e, "History save failed; continuing");
        }
        Ok(())
    }
}

/// Releases the exchange slot when the exchange resolves or fails.
struct ExchangeGuard<'a> {
    phase: &'a Mutex<ExchangePhase>,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = ExchangePhase::Idle;
        }
    }
}
