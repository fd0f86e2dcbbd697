//! The history buffer: one record per model round-trip.

use chrono::{DateTime, Utc};
use rag_turn::{ProviderMessage, TokenUsage};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// One completed model round-trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Model that served the call.
    pub model: String,
    /// Messages sent, system prompt first.
    pub messages: Vec<ProviderMessage>,
    /// Text of every returned choice.
    pub outputs: Vec<String>,
    /// Token usage reported for the call.
    pub usage: TokenUsage,
    /// Cost of the call, when the provider knows it.
    pub cost: Option<Decimal>,
    /// When the response arrived.
    pub timestamp: DateTime<Utc>,
}

/// Shared, ordered list of [`HistoryEntry`] records.
///
/// Cloning yields another handle to the same buffer. The lock is never held
/// across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl History {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        // A panic while pushing cannot leave the Vec half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a record.
    pub fn push(&self, entry: HistoryEntry) {
        self.lock().push(entry);
    }

    /// Take every record, leaving the buffer empty.
    pub fn drain(&self) -> Vec<HistoryEntry> {
        std::mem::take(&mut *self.lock())
    }

    /// Copy of the current records.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discard every record.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
