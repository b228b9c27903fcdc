//! Persistence bridge for Parley conversations.
//!
//! Synchronizes the in-memory conversation log to durable key-value storage
//! after every mutation and restores it at startup. Storage is an injected
//! dependency so tests can run against an in-memory fake.

pub mod bridge;
pub mod error;
pub mod storage;

pub use bridge::HistoryBridge;
pub use error::PersistError;
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
