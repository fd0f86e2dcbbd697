//! Model-call defaults.

use std::time::Duration;

/// Static configuration for a language-model handle.
///
/// Every call made through the handle uses these values; call-sites do not
/// override them individually.
#[derive(Debug, Clone, PartialEq)]
pub struct LmConfig {
    /// Model identifier (empty = provider default).
    pub model: String,

    /// Maximum output tokens per provider call.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// How many times a retryable provider error is retried.
    pub max_retries: u32,

    /// Base delay between retries; attempt `n` waits `n * retry_backoff`.
    pub retry_backoff: Duration,
}

impl LmConfig {
    /// Defaults with the given model.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 1000,
            temperature: 0.0,
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}
