//! OpenAI Chat Completions API request/response types.
//!
//! Groq and most self-hosted gateways accept the same shapes.

use serde::{Deserialize, Serialize};

/// Chat Completions request body.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// Model identifier (e.g. "llama-3.3-70b-versatile").
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAIMessage>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Number of choices to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
}

/// A message in Chat Completions format.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    /// Message text. Absent on some refusal/tool responses.
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat Completions response body.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Response choices.
    pub choices: Vec<OpenAIChoice>,
    /// Model that generated the response.
    pub model: String,
    /// Token usage statistics.
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

/// A single choice in the response.
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message.
    pub message: OpenAIMessage,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Number of tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens used (prompt + completion).
    #[serde(default)]
    pub total_tokens: Option<u64>,
}
