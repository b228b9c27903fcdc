//! Conversation controller for Parley.
//!
//! Orchestrates user-initiated exchanges against the remote query and
//! transcription services: appends the optimistic user entry and a
//! typing-indicator placeholder, issues the request, and rewrites the
//! placeholder with the rendered answer or a visible failure notice.
//! Every mutation is written through to the persistence bridge.

pub mod controller;
pub mod error;
pub mod render;

pub use controller::{ChatController, ExchangePhase, TYPING_INDICATOR, VOICE_MARKER};
pub use error::ChatError;
pub use render::render_markdown;
