//! The query route: rephrase, decide, answer or compute, follow up.

use crate::error::AgentError;
use crate::suite::AgentSuite;
use async_trait::async_trait;
use rag_signature::{Inputs, Prediction};
use rag_turn::Provider;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

/// Runs code written by the code generator and returns what it printed.
///
/// Object-safe; the pipeline holds it as `Arc<dyn CodeExecutor>`.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Execute `code` and capture its output.
    async fn execute(&self, code: &str)
    -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// How a query is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Answer from retrieved context.
    Answer,
    /// Generate and run code, then answer from its output.
    Compute,
}

impl Action {
    /// Read the action decider's free-text verdict from its first word.
    /// Anything that does not lead with `compute` is an answer.
    pub fn from_decision(text: &str) -> Self {
        let verdict = text
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_matches(|c: char| !c.is_alphanumeric());
        if verdict.eq_ignore_ascii_case("compute") {
            Self::Compute
        } else {
            Self::Answer
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Answer => "answer",
            Self::Compute => "compute",
        })
    }
}

/// A user query plus what the caller retrieved for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// The query as typed.
    pub query: String,
    /// Previous turns, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
    /// Retrieved passages or table descriptions.
    #[serde(default)]
    pub context: String,
}

impl PipelineRequest {
    /// A query with no history and no context.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Set the conversation history.
    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }

    /// Set the retrieved context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// Everything the route produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    /// The standalone query every later step saw.
    pub rephrased_query: String,
    /// The route taken.
    pub action: Action,
    /// The final answer.
    pub answer: String,
    /// Generated code, on the compute route.
    pub code: Option<String>,
    /// What the code printed, when it ran.
    pub code_output: Option<String>,
    /// Suggested next questions.
    pub follow_ups: Vec<String>,
}

/// Request parameters and body extracted from a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPlan {
    /// Query-string parameters.
    pub parameters: Value,
    /// Request body.
    pub body: Value,
}

/// Routes queries through the call-sites of an [`AgentSuite`].
pub struct RagPipeline<P: Provider> {
    suite: AgentSuite<P>,
    executor: Option<Arc<dyn CodeExecutor>>,
}

fn inputs<const N: usize>(pairs: [(&str, Value); N]) -> Inputs {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn text(prediction: &Prediction, field: &str) -> String {
    prediction.get_str(field).unwrap_or_default().trim().to_string()
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_code_fence(code: &str) -> &str {
    let code = code.trim();
    let Some(rest) = code.strip_prefix("```") else {
        return code;
    };
    // Drop the language tag line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

impl<P: Provider> RagPipeline<P> {
    /// A pipeline with no code executor: compute queries are answered
    /// without running code.
    pub fn new(suite: AgentSuite<P>) -> Self {
        Self {
            suite,
            executor: None,
        }
    }

    /// Run generated code with `executor`.
    pub fn with_executor(mut self, executor: Arc<dyn CodeExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// The call-sites.
    pub fn suite(&self) -> &AgentSuite<P> {
        &self.suite
    }

    /// Route one query.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineResponse, AgentError> {
        let query = self.rephrase(&request).await?;

        let decision = self
            .suite
            .query_action
            .call(inputs([("query", json!(query))]))
            .await?;
        let action = Action::from_decision(&text(&decision, "action"));
        tracing::info!(%action, query = %query, "query routed");

        let (answer, code, code_output) = match action {
            Action::Answer => {
                let prediction = self
                    .suite
                    .answer_from_context
                    .call(inputs([
                        ("context", json!(request.context)),
                        ("question", json!(query)),
                    ]))
                    .await?;
                (text(&prediction, "answer"), None, None)
            }
            Action::Compute => self.compute(&query, &request.context).await?,
        };

        let follow_ups = self.follow_ups(&query, &answer).await?;

        Ok(PipelineResponse {
            rephrased_query: query,
            action,
            answer,
            code,
            code_output,
            follow_ups,
        })
    }

    async fn rephrase(&self, request: &PipelineRequest) -> Result<String, AgentError> {
        if request.history.is_empty() {
            return Ok(request.query.clone());
        }
        let prediction = self
            .suite
            .query_rephrase
            .call(inputs([
                ("query", json!(request.query)),
                ("history", json!(request.history)),
            ]))
            .await?;
        let rephrased = text(&prediction, "rephrased_query");
        if rephrased.is_empty() {
            return Ok(request.query.clone());
        }
        tracing::debug!(original = %request.query, rephrased = %rephrased, "query rephrased");
        Ok(rephrased)
    }

    async fn compute(
        &self,
        query: &str,
        context: &str,
    ) -> Result<(String, Option<String>, Option<String>), AgentError> {
        let prediction = self
            .suite
            .code_generator
            .call(inputs([("query", json!(query)), ("context", json!(context))]))
            .await?;
        let code = strip_code_fence(&text(&prediction, "code")).to_string();

        match self.execute(&code).await {
            Ok(output) => {
                let prediction = self
                    .suite
                    .generate_response_using_code_output
                    .call(inputs([
                        ("query", json!(query)),
                        ("code", json!(code)),
                        ("code_output", json!(output)),
                    ]))
                    .await?;
                Ok((text(&prediction, "response"), Some(code), Some(output)))
            }
            Err(err) => {
                tracing::warn!(error = %err, "answering without code output");
                let prediction = self
                    .suite
                    .generate_response_without_code_output
                    .call(inputs([("query", json!(query)), ("context", json!(context))]))
                    .await?;
                Ok((text(&prediction, "response"), Some(code), None))
            }
        }
    }

    async fn execute(&self, code: &str) -> Result<String, AgentError> {
        let executor = self
            .executor
            .as_ref()
            .ok_or_else(|| AgentError::Execution("no code executor configured".into()))?;
        executor.execute(code).await.map_err(AgentError::Execution)
    }

    async fn follow_ups(&self, query: &str, answer: &str) -> Result<Vec<String>, AgentError> {
        let prediction = self
            .suite
            .follow_up_questions
            .call(inputs([("query", json!(query)), ("response", json!(answer))]))
            .await?;
        Ok(prediction.get_str_list("follow_up_questions"))
    }

    /// Pick the endpoints, from `endpoints`, that the query needs.
    pub async fn select_endpoints(
        &self,
        query: &str,
        endpoints: &[String],
    ) -> Result<Vec<String>, AgentError> {
        let prediction = self
            .suite
            .endpoint_array_generator
            .call(inputs([("query", json!(query)), ("endpoints", json!(endpoints))]))
            .await?;
        Ok(prediction.get_str_list("relevant_endpoints"))
    }

    /// Extract request parameters and body for one endpoint call.
    pub async fn plan_request(
        &self,
        query: &str,
        parameters_schema: &str,
        body_schema: &str,
    ) -> Result<RequestPlan, AgentError> {
        let prediction = self
            .suite
            .generate_request
            .call(inputs([
                ("request_parameters_schema", json!(parameters_schema)),
                ("request_body_schema", json!(body_schema)),
                ("query", json!(query)),
            ]))
            .await?;
        let field = |name: &str| prediction.get(name).cloned().unwrap_or_else(|| json!({}));
        Ok(RequestPlan {
            parameters: field("request_parameters"),
            body: field("request_body"),
        })
    }

    /// Write a response from context directly, skipping the route.
    pub async fn respond(&self, query: &str, context: &str) -> Result<String, AgentError> {
        let prediction = self
            .suite
            .generate_response
            .call(inputs([("query", json!(query)), ("context", json!(context))]))
            .await?;
        Ok(text(&prediction, "response"))
    }
}
