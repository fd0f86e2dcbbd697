#![deny(missing_docs)]
//! Language-model handle for call-sites.
//!
//! [`Lm`] wraps a [`rag_turn::Provider`] with the model defaults from
//! [`rag_turn::LmConfig`], retries transient provider failures, and records
//! every completed round-trip in a shared [`History`] buffer. Whoever needs
//! per-invocation accounting drains that buffer after the invocation.

pub mod history;
pub mod lm;

pub use history::{History, HistoryEntry};
pub use lm::Lm;
