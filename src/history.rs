//! Interaction history
//!
//! A bounded log of revealed bubbles, persisted as one JSON document so a
//! reloaded session can replay what the viewer last saw.

mod storage;
mod store;

#[cfg(test)]
mod proptests;

pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::{HistoryEntry, HistoryStore};

#[cfg(test)]
pub use storage::FailingStorage;
