//! Per-call-site cost and usage log.
//!
//! Entries are only ever appended; [`CallLogger::clear_logs`] is the single
//! way to reset, so totals never decrease between clears.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// One logged invocation of a call-site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Cost in USD, as reported (None if unknown).
    pub cost: Option<Decimal>,
    /// Tokens used, as reported (None if unknown).
    pub tokens: Option<u64>,
    /// Wall-clock time of the invocation.
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// Content of every prompt message sent.
    pub messages: Vec<String>,
    /// Every output returned.
    pub outputs: Vec<String>,
}

/// Entries of one call-site, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallSiteLog {
    /// Call-site name.
    pub name: String,
    /// Logged invocations.
    pub entries: Vec<LogEntry>,
}

/// Running totals across every logged entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LogTotals {
    /// Sum of known costs.
    pub cost: Decimal,
    /// Sum of known token counts.
    pub tokens: u64,
    /// Sum of invocation times.
    #[serde(rename = "time_secs", serialize_with = "serialize_secs")]
    pub time: Duration,
}

/// Point-in-time copy of a [`CallLogger`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogSnapshot {
    /// Call-sites in first-logged order.
    pub calls: Vec<CallSiteLog>,
    /// Totals.
    pub totals: LogTotals,
}

impl LogSnapshot {
    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl fmt::Display for LogSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No logs recorded yet.");
        }
        for call in &self.calls {
            writeln!(f, "\nAgent: {}", call.name)?;
            for entry in &call.entries {
                match entry.cost {
                    Some(cost) => writeln!(f, "Cost: {cost}")?,
                    None => writeln!(f, "Cost: unknown")?,
                }
                match entry.tokens {
                    Some(tokens) => writeln!(f, "Tokens: {tokens}")?,
                    None => writeln!(f, "Tokens: unknown")?,
                }
                writeln!(f, "Time: {:.3} seconds", entry.elapsed.as_secs_f64())?;
                writeln!(f, "\nMessages:")?;
                for (i, message) in entry.messages.iter().enumerate() {
                    writeln!(f, "  [{}] {}", i + 1, message)?;
                }
                writeln!(f, "\nOutputs:")?;
                for (i, output) in entry.outputs.iter().enumerate() {
                    writeln!(f, "  [{}] {}", i + 1, output)?;
                }
            }
        }
        writeln!(
            f,
            "\nTotal: cost {} | tokens {} | time {:.3} seconds",
            self.totals.cost,
            self.totals.tokens,
            self.totals.time.as_secs_f64()
        )
    }
}

#[derive(Default)]
struct LoggerState {
    calls: Vec<CallSiteLog>,
    totals: LogTotals,
}

/// Records cost, tokens, time, prompts and outputs per call-site.
///
/// Safe to share behind an `Arc`; every method takes `&self`.
#[derive(Default)]
pub struct CallLogger {
    tracked: Option<HashSet<String>>,
    state: Mutex<LoggerState>,
}

impl CallLogger {
    /// A logger that records every call-site.
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger that records only the named call-sites.
    ///
    /// An empty set records everything.
    pub fn with_tracked<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tracked: HashSet<String> = names.into_iter().map(Into::into).collect();
        Self {
            tracked: (!tracked.is_empty()).then_some(tracked),
            state: Mutex::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether entries for `name` are recorded.
    pub fn is_tracked(&self, name: &str) -> bool {
        self.tracked.as_ref().is_none_or(|set| set.contains(name))
    }

    /// Append an entry for `name` and add it to the totals.
    ///
    /// Untracked names are ignored. Missing cost or tokens count as zero
    /// in the totals but are kept as unknown in the entry. Returns whether
    /// the entry was recorded.
    pub fn add_log(
        &self,
        name: &str,
        cost: Option<Decimal>,
        tokens: Option<u64>,
        duration: Duration,
        messages: Vec<String>,
        outputs: Vec<String>,
    ) -> bool {
        if !self.is_tracked(name) {
            return false;
        }

        tracing::debug!(
            agent = name,
            cost = ?cost,
            tokens = ?tokens,
            elapsed_ms = duration.as_millis() as u64,
            "call logged"
        );

        let entry = LogEntry {
            cost,
            tokens,
            elapsed: duration,
            messages,
            outputs,
        };

        let mut state = self.lock();
        state.totals.cost += cost.unwrap_or(Decimal::ZERO);
        state.totals.tokens += tokens.unwrap_or(0);
        state.totals.time += duration;
        match state.calls.iter_mut().find(|c| c.name == name) {
            Some(call) => call.entries.push(entry),
            None => state.calls.push(CallSiteLog {
                name: name.to_string(),
                entries: vec![entry],
            }),
        }
        true
    }

    /// Entries logged for `name`, oldest first.
    pub fn entries(&self, name: &str) -> Vec<LogEntry> {
        self.lock()
            .calls
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.entries.clone())
            .unwrap_or_default()
    }

    /// Running totals.
    pub fn totals(&self) -> LogTotals {
        self.lock().totals
    }

    /// Copy of everything logged so far.
    pub fn snapshot(&self) -> LogSnapshot {
        let state = self.lock();
        LogSnapshot {
            calls: state.calls.clone(),
            totals: state.totals,
        }
    }

    /// Render the report, emit it at `info` level and return it.
    pub fn show_logs(&self) -> String {
        let report = self.snapshot().to_string();
        tracing::info!(target: "rag_agents::logger", "{report}");
        report
    }

    /// Drop every entry and reset the totals.
    pub fn clear_logs(&self) {
        *self.lock() = LoggerState::default();
    }
}
