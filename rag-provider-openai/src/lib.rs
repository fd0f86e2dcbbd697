#![deny(missing_docs)]
//! OpenAI-compatible chat completions provider.
//!
//! Implements [`rag_turn::Provider`] for any `/chat/completions` endpoint
//! that speaks the OpenAI wire format. [`OpenAiProvider::groq`] points at
//! Groq's compatible endpoint; [`OpenAiProvider::with_base_url`] covers local
//! gateways. Costs come from the [`pricing`] table.

pub mod pricing;
mod error;
mod types;

use error::{map_http_status, map_reqwest_error};
use pricing::Pricing;
use rag_turn::provider::{Provider, ProviderError};
use rag_turn::types::*;
use types::*;
use zeroize::Zeroizing;

/// Default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Groq's OpenAI-compatible base URL.
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model for the OpenAI endpoint.
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default model for the Groq endpoint.
const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Chat completions provider for OpenAI-compatible endpoints.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Zeroizing<String>,
    base_url: String,
    model: String,
    pricing: Option<Pricing>,
}

impl OpenAiProvider {
    /// Provider for the OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: Zeroizing::new(api_key.into()),
            base_url: OPENAI_BASE_URL.into(),
            model: OPENAI_DEFAULT_MODEL.into(),
            pricing: None,
        }
    }

    /// Provider for Groq's OpenAI-compatible endpoint.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GROQ_BASE_URL.into(),
            model: GROQ_DEFAULT_MODEL.into(),
            ..Self::new(api_key)
        }
    }

    /// Override the API base URL (proxies, local gateways, tests).
    ///
    /// A trailing slash is stripped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Model used when the request does not name one.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Fixed pricing, overriding the built-in table.
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = Some(pricing);
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, request: &ProviderRequest) -> OpenAIRequest {
        let model = request
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.model.clone());

        let messages = request
            .messages
            .iter()
            .map(|m| OpenAIMessage {
                role: m.role.as_str().to_string(),
                content: Some(m.content.clone()),
            })
            .collect();

        let n = request
            .extra
            .get("n")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok());

        OpenAIRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            n,
        }
    }

    fn parse_response(&self, response: OpenAIResponse) -> ProviderResponse {
        let stop_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .map(parse_finish_reason)
            .unwrap_or(StopReason::EndTurn);

        let outputs = response
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect();

        let usage = response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        let cost = self
            .pricing
            .or_else(|| pricing::lookup(&response.model))
            .map(|p| p.cost(&usage));

        ProviderResponse {
            outputs,
            stop_reason,
            usage,
            model: response.model,
            cost,
        }
    }
}

impl Provider for OpenAiProvider {
    fn complete(
        &self,
        request: ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        let api_request = self.build_request(&request);
        let url = self.completions_url();

        tracing::debug!(
            url = %url,
            model = %api_request.model,
            messages = api_request.messages.len(),
            "sending chat completion request"
        );

        let http_request = self
            .client
            .post(url)
            .bearer_auth(self.api_key.as_str())
            .header("content-type", "application/json")
            .json(&api_request);

        async move {
            let http_response = http_request.send().await.map_err(map_reqwest_error)?;

            let status = http_response.status();
            if !status.is_success() {
                let body = http_response.text().await.unwrap_or_default();
                return Err(map_http_status(status, &body));
            }

            let api_response: OpenAIResponse = http_response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

            Ok(self.parse_response(api_response))
        }
    }
}

fn parse_finish_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    }
}
