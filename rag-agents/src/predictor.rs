//! The logging proxy around a call-site.

use crate::error::AgentError;
use crate::logger::CallLogger;
use rag_lm::Lm;
use rag_signature::{Adapter, ChatAdapter, Inputs, JsonAdapter, Prediction, Signature};
use rag_turn::Provider;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A named call-site whose every invocation is logged.
///
/// An invocation formats the signature with [`ChatAdapter`]; if the
/// completion cannot be parsed it retries once with [`JsonAdapter`]. Every
/// round-trip lands in the LM's history buffer, which is drained afterwards
/// and aggregated into one [`CallLogger`] entry under the call-site's name.
pub struct LoggedPredictor<P: Provider> {
    name: String,
    signature: Signature,
    lm: Arc<Lm<P>>,
    logger: Arc<CallLogger>,
}

impl<P: Provider> LoggedPredictor<P> {
    /// Create a call-site.
    pub fn new(
        name: impl Into<String>,
        signature: Signature,
        lm: Arc<Lm<P>>,
        logger: Arc<CallLogger>,
    ) -> Self {
        Self {
            name: name.into(),
            signature,
            lm,
            logger,
        }
    }

    /// The fixed name entries are logged under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The call-site's signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke the call-site.
    ///
    /// Logging never changes the result. The history buffer is drained on
    /// every path, including when the returned future is dropped before it
    /// completes, and an entry is written whenever at least one round-trip
    /// completed.
    pub async fn call(&self, inputs: Inputs) -> Result<Prediction, AgentError> {
        self.signature.check_inputs(&inputs)?;

        // Declared after the lock so it drains before the lock is released.
        let _lock = self.lm.invocation_lock().await;
        let _entry = PendingEntry {
            predictor: self,
            start: Instant::now(),
        };
        self.predict(&inputs).await
    }

    async fn predict(&self, inputs: &Inputs) -> Result<Prediction, AgentError> {
        let completion = self.complete(&ChatAdapter, inputs).await?;
        match ChatAdapter.parse(&self.signature, &completion) {
            Ok(prediction) => Ok(prediction),
            Err(err) if err.is_parse_failure() => {
                tracing::debug!(agent = %self.name, error = %err, "falling back to json adapter");
                let completion = self.complete(&JsonAdapter, inputs).await?;
                Ok(JsonAdapter.parse(&self.signature, &completion)?)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn complete(&self, adapter: &dyn Adapter, inputs: &Inputs) -> Result<String, AgentError> {
        let messages = adapter.format(&self.signature, inputs);
        self.lm
            .call(messages)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::EmptyCompletion(self.name.clone()))
    }

    fn record(&self, elapsed: Duration) {
        let records = self.lm.history().drain();
        if records.is_empty() {
            return;
        }

        let mut cost = Decimal::ZERO;
        let mut tokens: u64 = 0;
        let mut messages = Vec::new();
        let mut outputs = Vec::new();
        for record in records {
            cost += record.cost.unwrap_or(Decimal::ZERO);
            tokens += record.usage.total();
            messages.extend(record.messages.into_iter().map(|m| m.content));
            outputs.extend(record.outputs);
        }

        self.logger
            .add_log(&self.name, Some(cost), Some(tokens), elapsed, messages, outputs);
    }
}

/// Drains the history into the call logger when the invocation ends,
/// whether it returned or was cancelled.
struct PendingEntry<'a, P: Provider> {
    predictor: &'a LoggedPredictor<P>,
    start: Instant,
}

impl<P: Provider> Drop for PendingEntry<'_, P> {
    fn drop(&mut self) {
        self.predictor.record(self.start.elapsed());
    }
}
