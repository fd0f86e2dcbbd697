//! The language-model handle.

use crate::history::{History, HistoryEntry};
use chrono::Utc;
use rag_turn::{LmConfig, Provider, ProviderError, ProviderMessage, ProviderRequest};
use tokio::sync::{Mutex, MutexGuard};

/// A configured model plus its history buffer.
///
/// Generic over `P: Provider` (not object-safe). Share it between call-sites
/// behind an `Arc`.
pub struct Lm<P: Provider> {
    provider: P,
    config: LmConfig,
    history: History,
    invocation: Mutex<()>,
}

impl<P: Provider> Lm<P> {
    /// Create a handle with an empty history buffer.
    pub fn new(provider: P, config: LmConfig) -> Self {
        Self {
            provider,
            config,
            history: History::new(),
            invocation: Mutex::new(()),
        }
    }

    /// The defaults every call uses.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// The shared history buffer.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Exclusive access for one logical invocation.
    ///
    /// Holders see only the history records produced while they hold the
    /// guard, provided every caller that drains the buffer takes it first.
    pub async fn invocation_lock(&self) -> MutexGuard<'_, ()> {
        self.invocation.lock().await
    }

    fn build_request(&self, messages: Vec<ProviderMessage>) -> ProviderRequest {
        ProviderRequest {
            model: if self.config.model.is_empty() {
                None
            } else {
                Some(self.config.model.clone())
            },
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            extra: serde_json::Value::Null,
        }
    }

    /// Send one prompt and return the text of every choice.
    ///
    /// Retryable errors are retried up to `max_retries` times, waiting
    /// `attempt * retry_backoff` between tries. Each successful round-trip
    /// appends exactly one [`HistoryEntry`]; failed attempts append nothing.
    pub async fn call(&self, messages: Vec<ProviderMessage>) -> Result<Vec<String>, ProviderError> {
        let mut attempt: u32 = 0;
        loop {
            let request = self.build_request(messages.clone());
            match self.provider.complete(request).await {
                Ok(response) => {
                    tracing::debug!(
                        model = %response.model,
                        tokens = response.usage.total(),
                        cost = ?response.cost,
                        outputs = response.outputs.len(),
                        "lm round-trip complete"
                    );
                    self.history.push(HistoryEntry {
                        model: response.model,
                        messages,
                        outputs: response.outputs.clone(),
                        usage: response.usage,
                        cost: response.cost,
                        timestamp: Utc::now(),
                    });
                    return Ok(response.outputs);
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_backoff * attempt;
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying model call"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, attempts = attempt + 1, "model call failed");
                    return Err(err);
                }
            }
        }
    }
}
