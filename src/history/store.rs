//! Bounded, persisted interaction log

use super::storage::{KeyValueStorage, StorageResult};
use crate::bubble::markup;
use crate::bubble::BubbleRole;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Storage key holding the committed interaction log
pub const INTERACTIONS_KEY: &str = "chat-bubble-interactions";

/// Throwaway key written and removed to probe the medium
const PROBE_KEY: &str = "chat-bubble-storage-test";

/// One revealed bubble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Payload exactly as rendered, including any button markup
    pub say: String,
    /// Role tag of the bubble
    pub reply: BubbleRole,
}

/// Bounded FIFO of [`HistoryEntry`] mirrored to a key-value medium.
///
/// Persistence is on only when the capacity is non-zero and the medium
/// accepted a probe write at open time. `record` and `commit` are separate;
/// a crash between the two loses the uncommitted entry.
pub struct HistoryStore {
    storage: Option<Arc<dyn KeyValueStorage>>,
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl HistoryStore {
    pub fn open(storage: Arc<dyn KeyValueStorage>, capacity: usize) -> Self {
        if capacity == 0 {
            return Self::disabled();
        }
        if let Err(e) = probe(storage.as_ref()) {
            tracing::warn!(
                error = %e,
                "Storage medium is not writable, interactions will not be remembered"
            );
            return Self::disabled();
        }

        let store = Self {
            storage: Some(storage),
            capacity,
            entries: Mutex::new(VecDeque::new()),
        };
        let mut loaded: VecDeque<HistoryEntry> = store.load().into();
        // A log committed under a larger capacity would otherwise never
        // shrink, since insertion evicts only one entry at a time
        let excess = loaded.len().saturating_sub(capacity + 1);
        if excess > 0 {
            tracing::debug!(excess, capacity, "Trimming interaction history to capacity");
            loaded.drain(..excess);
        }
        tracing::debug!(count = loaded.len(), capacity, "Loaded interaction history");
        *store.entries() = loaded;
        store
    }

    /// A store that remembers nothing
    pub fn disabled() -> Self {
        Self {
            storage: None,
            capacity: 0,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.storage.is_some()
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the in-memory log, oldest first
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries().iter().cloned().collect()
    }

    /// Append a revealed bubble, returning whether it was kept.
    ///
    /// Button-bearing payloads are only kept when they are the viewer's own
    /// free text or pick; offered menus are never remembered. Once the log
    /// exceeds `capacity`, one oldest entry is evicted per insertion, so it
    /// holds at most `capacity + 1`.
    pub fn record(&self, say: &str, role: BubbleRole) -> bool {
        if !self.is_enabled() {
            return false;
        }
        if markup::contains_button(say) && !role.is_memorable_reply() {
            return false;
        }

        let mut entries = self.entries();
        if entries.len() > self.capacity {
            entries.pop_front();
        }
        entries.push_back(HistoryEntry {
            say: say.to_string(),
            reply: role,
        });
        true
    }

    /// Write the whole log to the medium
    pub fn commit(&self) -> StorageResult<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let json = serde_json::to_string(&self.snapshot())?;
        storage.set(INTERACTIONS_KEY, &json)
    }

    /// The last committed log, or nothing if absent, corrupt or unavailable
    pub fn load(&self) -> Vec<HistoryEntry> {
        let Some(storage) = &self.storage else {
            return Vec::new();
        };
        match storage.get(INTERACTIONS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding corrupt interaction history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read interaction history");
                Vec::new()
            }
        }
    }
}

fn probe(storage: &dyn KeyValueStorage) -> StorageResult<()> {
    storage.set(PROBE_KEY, PROBE_KEY)?;
    storage.remove(PROBE_KEY)
}
