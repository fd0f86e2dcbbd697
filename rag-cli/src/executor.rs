//! Runs generated code in a child interpreter.

use async_trait::async_trait;
use rag_agents::CodeExecutor;
use std::time::Duration;
use tokio::process::Command;

/// How long generated code may run before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Passes code to `<interpreter> -c <code>` and returns its stdout.
///
/// The child is killed when it outlives the timeout.
pub struct InterpreterExecutor {
    interpreter: String,
    timeout: Duration,
}

impl InterpreterExecutor {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CodeExecutor for InterpreterExecutor {
    async fn execute(
        &self,
        code: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(interpreter = %self.interpreter, bytes = code.len(), "executing generated code");
        let run = Command::new(&self.interpreter)
            .arg("-c")
            .arg(code)
            .kill_on_drop(true)
            .output();
        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(output) => output?,
            Err(_elapsed) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!(
                        "{} timed out after {:.1}s",
                        self.interpreter,
                        self.timeout.as_secs_f64()
                    ),
                )
                .into());
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.interpreter,
                output.status,
                stderr.trim()
            )
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
