//! Errors from call-sites and the pipeline.

use rag_signature::SignatureError;
use rag_turn::ProviderError;
use thiserror::Error;

/// Errors from invoking a call-site.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AgentError {
    /// Inputs did not match the signature, or the completion could not be parsed.
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// The model call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider answered with no choices.
    #[error("{0}: model returned no output")]
    EmptyCompletion(String),

    /// Generated code could not be executed.
    #[error("code execution failed: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),
}
