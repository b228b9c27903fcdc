//! The ordered conversation log.

use crate::error::StoreError;
use crate::types::Message;

/// Ordered log of chat entries, insertion-order significant.
///
/// Append-only except for [`ConversationLog::replace_last`], which rewrites
/// exactly the final element, and [`ConversationLog::clear`], which resets
/// the whole log. The log never reorders and has no internal side effects;
/// callers are responsible for triggering persistence after mutations.
#[derive(Debug, Default, Clone)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log from a previously persisted snapshot.
    pub fn from_snapshot(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Append a message to the end of the log. Always succeeds.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Overwrite the final element of the log.
    ///
    /// Returns [`StoreError::Empty`] without mutating anything if the log
    /// holds no messages.
    pub fn replace_last(&mut self, message: Message) -> Result<(), StoreError> {
        match self.messages.last_mut() {
            Some(last) => {
                *last = message;
                Ok(())
            }
            None => Err(StoreError::Empty),
        }
    }

    /// Full ordered copy of the log for rendering or persistence.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// The final entry, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Remove every entry (full reset).
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
