//! Pending batches: per-conversation magnet lists awaiting a folder choice.
//!
//! Entries live until they are consumed by a dispatch or cancelled; there is
//! no time-to-live. A new submission replaces whatever was pending for that
//! conversation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Shared registry of conversation id -> pending magnet URIs.
#[derive(Default)]
pub struct PendingBatchRegistry {
    batches: Mutex<HashMap<i64, Vec<String>>>,
}

impl PendingBatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a batch for a conversation, replacing any unconsumed one.
    pub fn insert(&self, chat_id: i64, magnets: Vec<String>) {
        self.batches.lock().unwrap().insert(chat_id, magnets);
    }

    /// Consume the pending batch. `None` means there is nothing pending
    /// (the folder-choice event is expired).
    pub fn take(&self, chat_id: i64) -> Option<Vec<String>> {
        self.batches.lock().unwrap().remove(&chat_id)
    }

    /// Drop the pending batch without dispatching. Returns whether an entry
    /// existed.
    pub fn cancel(&self, chat_id: i64) -> bool {
        self.batches.lock().unwrap().remove(&chat_id).is_some()
    }
}
