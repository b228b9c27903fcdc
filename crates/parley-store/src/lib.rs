//! Message store for Parley conversations.
//!
//! Holds the ordered log of chat entries that is the source of truth for
//! rendering and persistence. The log is append-only apart from a single
//! replace-last operation used to turn a placeholder into a final reply.

pub mod error;
pub mod log;
pub mod types;

pub use error::StoreError;
pub use log::ConversationLog;
pub use types::{Message, Sender};
