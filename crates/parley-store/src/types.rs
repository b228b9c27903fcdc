use serde::{Deserialize, Serialize};

/// Who produced a chat entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The person typing or speaking into the widget.
    User,
    /// The remote query service.
    Bot,
}

/// A single chat entry.
///
/// Immutable once appended; only the most recent entry of a conversation may
/// be replaced (placeholder-to-final rewrite). The serialized shape matches
/// the persisted history format: `{"sender", "content", "isHtml"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    /// When true, `content` is pre-rendered markup rather than literal text.
    #[serde(rename = "isHtml", default)]
    pub is_markup: bool,
}

impl Message {
    /// A plain-text user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
            is_markup: false,
        }
    }

    /// A plain-text bot entry.
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            content: content.into(),
            is_markup: false,
        }
    }

    /// A bot entry whose content is pre-rendered markup.
    pub fn bot_markup(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            content: content.into(),
            is_markup: true,
        }
    }
}
