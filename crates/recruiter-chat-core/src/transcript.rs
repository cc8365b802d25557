//! Append-only, time-ordered transcript store.

use std::sync::{PoisonError, RwLock};

use crate::{MessageEntry, Role};

/// Ordered message history for one conversation.
///
/// Entries are only ever appended. Insertion order is display order, and
/// timestamps never decrease: an entry stamped earlier than the current
/// tail (clock stepped backwards) takes the tail's timestamp.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: RwLock<Vec<MessageEntry>>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcript holding a single assistant greeting.
    #[must_use]
    pub fn seeded(greeting: impl Into<String>) -> Self {
        let transcript = Self::new();
        transcript.append(MessageEntry::now(Role::Assistant, greeting));
        transcript
    }

    /// Append an entry and return it as stored.
    pub fn append(&self, entry: MessageEntry) -> MessageEntry {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = match entries.last() {
            Some(tail) => entry.not_before(tail.timestamp()),
            None => entry,
        };
        entries.push(entry.clone());
        entry
    }

    /// Copy of the current entries, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<MessageEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}
