#![deny(missing_docs)]
//! Shared vocabulary for model calls.
//!
//! Provides the [`Provider`] trait every LLM backend implements, the
//! request/response/message types that cross that boundary, and the
//! [`LmConfig`] defaults used when a call-site does not override them.

pub mod config;
pub mod provider;
pub mod types;

// Re-exports
pub use config::LmConfig;
pub use provider::{Provider, ProviderError};
pub use types::*;
