//! The history bridge: serialization between the conversation log and a
//! snapshot storage backend.

use std::sync::Arc;

use tracing::debug;

use parley_store::Message;

use crate::error::PersistError;
use crate::storage::SnapshotStorage;

/// Write-through persistence for a conversation.
///
/// Serializes the full message sequence as a JSON array under a namespaced
/// key. `save` is invoked after every store mutation, so the durable copy
/// always equals the in-memory log once a mutation completes.
pub struct HistoryBridge {
    storage: Arc<dyn SnapshotStorage>,
    key: String,
}

impl HistoryBridge {
    pub fn new(storage: Arc<dyn SnapshotStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// The storage key this bridge reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted conversation.
    ///
    /// A missing key yields an empty sequence. Data that exists but cannot
    /// be decoded yields [`PersistError::Corrupt`]; callers are expected to
    /// log it and fall back to an empty conversation.
    pub fn load(&self) -> Result<Vec<Message>, PersistError> {
        let Some(raw) = self.storage.read(&self.key)? else {
            debug!(key = %self.key, "No persisted history found");
            return Ok(Vec::new());
        };
        let messages: Vec<Message> =
            serde_json::from_str(&raw).map_err(|e| PersistError::Corrupt(e.to_string()))?;
        debug!(key = %self.key, count = messages.len(), "History loaded");
        Ok(messages)
    }

    /// Persist the full conversation snapshot.
    pub fn save(&self, messages: &[Message]) -> Result<(), PersistError> {
        let raw = serde_json::to_string(messages)
            .map_err(|e| PersistError::Serialization(e.to_string()))?;
        self.storage.write(&self.key, &raw)?;
        debug!(key = %self.key, count = messages.len(), "History saved");
        Ok(())
    }

    /// Drop the persisted snapshot entirely.
    pub fn reset(&self) -> Result<(), PersistError> {
        self.storage.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    fn bridge_with_memory() -> (HistoryBridge, MemoryStorage) {
        let storage = MemoryStorage::new();
        let bridge = HistoryBridge::new(Arc::new(storage.clone()), "test_history");
        (bridge, storage)
    }

    #[test]
    fn test_load_missing_key_returns_empty() {
        let (bridge, _) = bridge_with_memory();
        assert!(bridge.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (bridge, _) = bridge_with_memory();
        let messages = vec![
            Message::user("Hello"),
            Message::bot_markup("<strong>Hi</strong>"),
            Message::user("🎤 [Voice Input]"),
        ];
        bridge.save(&messages).unwrap();
        assert_eq!(bridge.load().unwrap(), messages);
    }

    #[test]
    fn test_roundtrip_empty_sequence() {
        let (bridge, storage) = bridge_with_memory();
        bridge.save(&[]).unwrap();
        assert_eq!(storage.raw("test_history").unwrap(), "[]");
        assert!(bridge.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_is_idempotent() {
        let (bridge, storage) = bridge_with_memory();
        let messages = vec![Message::user("once")];
        bridge.save(&messages).unwrap();
        let first = storage.raw("test_history").unwrap();
        bridge.save(&messages).unwrap();
        let second = storage.raw("test_history").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_corrupt_data_fails_with_corrupt_error() {
        let (bridge, storage) = bridge_with_memory();
        storage.seed("test_history", "{not valid json");
        assert!(matches!(bridge.load(), Err(PersistError::Corrupt(_))));
    }

    #[test]
    fn test_load_wrong_shape_fails_with_corrupt_error() {
        let (bridge, storage) = bridge_with_memory();
        // Valid JSON, but not an array of messages.
        storage.seed("test_history", r#"{"sender":"user"}"#);
        assert!(matches!(bridge.load(), Err(PersistError::Corrupt(_))));
    }

    #[test]
    fn test_persisted_shape_matches_original_widget_format() {
        let (bridge, storage) = bridge_with_memory();
        bridge
            .save(&[Message::bot_markup("<em>ok</em>")])
            .unwrap();
        assert_eq!(
            storage.raw("test_history").unwrap(),
            r#"[{"sender":"bot","content":"<em>ok</em>","isHtml":true}]"#
        );
    }

    #[test]
    fn test_load_accepts_snapshot_written_by_original_widget() {
        let (bridge, storage) = bridge_with_memory();
        storage.seed(
            "test_history",
            r#"[{"sender":"user","content":"hi","isHtml":false},{"sender":"bot","content":"<p>hey</p>","isHtml":true}]"#,
        );
        let messages = bridge.load().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("hi"));
        assert!(messages[1].is_markup);
    }

    #[test]
    fn test_reset_removes_snapshot() {
        let (bridge, storage) = bridge_with_memory();
        bridge.save(&[Message::user("bye")]).unwrap();
        bridge.reset().unwrap();
        assert!(storage.raw("test_history").is_none());
        assert!(bridge.load().unwrap().is_empty());
    }

    #[test]
    fn test_bridges_with_distinct_keys_do_not_interfere() {
        let storage = MemoryStorage::new();
        let a = HistoryBridge::new(Arc::new(storage.clone()), "widget_a");
        let b = HistoryBridge::new(Arc::new(storage.clone()), "widget_b");
        a.save(&[Message::user("for a")]).unwrap();
        b.save(&[Message::user("for b")]).unwrap();
        assert_eq!(a.load().unwrap()[0].content, "for a");
        assert_eq!(b.load().unwrap()[0].content, "for b");
    }

    #[test]
    fn test_file_backed_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));
        let bridge = HistoryBridge::new(storage, "parley_chat_history");
        let messages = vec![Message::user("persisted"), Message::bot("reply")];
        bridge.save(&messages).unwrap();

        // A fresh bridge over the same directory sees the same snapshot.
        let reopened = HistoryBridge::new(
            Arc::new(FileStorage::new(dir.path())),
            "parley_chat_history",
        );
        assert_eq!(reopened.load().unwrap(), messages);
    }
}
