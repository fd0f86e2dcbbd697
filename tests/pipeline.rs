//! End-to-end checks of the query pipeline without live API keys.
//!
//! 1. **HTTP backend**: the full route over the OpenAI-compatible provider,
//!    served by wiremock, with cost taken from the pricing table
//! 2. **Settings**: the tracked-agent filter and LM defaults from a
//!    settings file drive the logger and the model handle
//! 3. **Adapter fallback**: an unparseable chat completion is retried in
//!    JSON form and logged as one invocation

use async_trait::async_trait;
use rag_agents::{
    Action, AgentSuite, CallLogger, CodeExecutor, PipelineRequest, RagPipeline, names,
};
use rag_config::Settings;
use rag_lm::Lm;
use rag_provider_openai::OpenAiProvider;
use rag_turn::{
    LmConfig, Provider, ProviderError, ProviderRequest, ProviderResponse, StopReason, TokenUsage,
};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ScriptedProvider: canned replies in order, no network
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct ScriptedProvider {
    replies: Mutex<VecDeque<&'static str>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<&'static str>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

impl Provider for ScriptedProvider {
    fn complete(
        &self,
        _request: ProviderRequest,
    ) -> impl std::future::Future<Output = Result<ProviderResponse, ProviderError>> + Send {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedProvider: no more replies");
        async move {
            Ok(ProviderResponse {
                outputs: vec![reply.to_string()],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage {
                    input_tokens: 25,
                    output_tokens: 10,
                    total_tokens: None,
                },
                model: "mock-model".into(),
                cost: Some(Decimal::new(1, 4)), // $0.0001
            })
        }
    }
}

fn chat_completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120}
    })
}

async fn mount_reply(server: &MockServer, marker: &str, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(content)))
        .expect(1)
        .mount(server)
        .await;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pattern 1: HTTP backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn answer_route_over_http() {
    let server = MockServer::start().await;
    // Each call-site is recognised by its task statement.
    mount_reply(&server, "Decide how the query should be handled.", "[[ ## action ## ]]\nanswer")
        .await;
    mount_reply(
        &server,
        "Answer the question using only the information in the context.",
        "[[ ## answer ## ]]\nThe warranty lasts two years.",
    )
    .await;
    mount_reply(
        &server,
        "Suggest follow-up questions",
        "[[ ## follow_up_questions ## ]]\n- Does it cover batteries?\n- How do I file a claim?",
    )
    .await;

    let provider = OpenAiProvider::groq("gsk-test").with_base_url(server.uri());
    let lm = Arc::new(Lm::new(provider, LmConfig::with_model("llama-3.3-70b-versatile")));
    let logger = Arc::new(CallLogger::new());
    let pipeline = RagPipeline::new(AgentSuite::new(lm, logger.clone()));

    let response = pipeline
        .run(
            PipelineRequest::new("How long is the warranty?")
                .with_context("All devices carry a two-year warranty."),
        )
        .await
        .unwrap();

    assert_eq!(response.action, Action::Answer);
    assert_eq!(response.answer, "The warranty lasts two years.");
    assert_eq!(
        response.follow_ups,
        vec!["Does it cover batteries?", "How do I file a claim?"]
    );

    let totals = logger.totals();
    assert_eq!(totals.tokens, 360);
    assert!(totals.cost > Decimal::ZERO);
    let basic = logger.entries(names::ANSWER_FROM_CONTEXT);
    assert_eq!(basic.len(), 1);
    assert!(basic[0].messages.iter().any(|m| m.contains("two-year warranty")));
}

#[tokio::test]
async fn provider_failure_surfaces_and_logs_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::groq("bad").with_base_url(server.uri());
    let lm = Arc::new(Lm::new(provider, LmConfig::default()));
    let logger = Arc::new(CallLogger::new());
    let pipeline = RagPipeline::new(AgentSuite::new(lm.clone(), logger.clone()));

    let err = pipeline.run(PipelineRequest::new("hi")).await.unwrap_err();
    assert!(matches!(
        err,
        rag_agents::AgentError::Provider(ProviderError::AuthFailed(_))
    ));
    assert!(logger.snapshot().is_empty());
    assert!(lm.history().is_empty());
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pattern 2: Settings drive the logger and LM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct TableExecutor;

#[async_trait]
impl CodeExecutor for TableExecutor {
    async fn execute(
        &self,
        _code: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok("42".into())
    }
}

#[tokio::test]
async fn tracked_agents_from_settings() {
    let settings = Settings::from_json_str(
        r#"{
            "lm": {"model": "mock-model", "max_retries": 0},
            "tracked_agents": ["code gen agent", "generate response using code ouptut"]
        }"#,
    )
    .unwrap();
    settings.validate().unwrap();

    let provider = ScriptedProvider::new(vec![
        "[[ ## action ## ]]\ncompute",
        "[[ ## code ## ]]\nprint(sum(rows))",
        "[[ ## response ## ]]\nThere are 42 orders.",
        "[[ ## follow_up_questions ## ]]\n[]",
    ]);
    let lm = Arc::new(Lm::new(provider, settings.lm_config()));
    let logger = Arc::new(CallLogger::with_tracked(settings.tracked_agents.iter().cloned()));
    let pipeline =
        RagPipeline::new(AgentSuite::new(lm, logger.clone())).with_executor(Arc::new(TableExecutor));

    let response = pipeline
        .run(PipelineRequest::new("How many orders?").with_context("orders.csv: id, total"))
        .await
        .unwrap();
    assert_eq!(response.action, Action::Compute);
    assert_eq!(response.code_output.as_deref(), Some("42"));
    assert_eq!(response.answer, "There are 42 orders.");

    let logged: Vec<String> = logger.snapshot().calls.into_iter().map(|c| c.name).collect();
    assert_eq!(
        logged,
        vec![names::CODE_GENERATOR, names::RESPONSE_WITH_CODE_OUTPUT]
    );
    // Only the two tracked invocations count.
    assert_eq!(logger.totals().tokens, 70);
    assert_eq!(logger.totals().cost, Decimal::new(2, 4));

    let seen = pipeline.suite().lm().config().model.clone();
    assert_eq!(seen, "mock-model");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pattern 3: Adapter fallback is one logged invocation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn fallback_is_aggregated_into_one_entry() {
    let provider = ScriptedProvider::new(vec![
        "I think the user wants to know about refunds.",
        r#"{"rephrased_query": "What is the refund policy for damaged items?"}"#,
    ]);
    let lm = Arc::new(Lm::new(provider, LmConfig::default()));
    let logger = Arc::new(CallLogger::new());
    let suite = AgentSuite::new(lm, logger.clone());

    let mut inputs = rag_signature::Inputs::new();
    inputs.insert("query".into(), serde_json::json!("and for damaged ones?"));
    inputs.insert(
        "history".into(),
        serde_json::json!(["What is the refund policy?"]),
    );
    let prediction = suite.query_rephrase.call(inputs).await.unwrap();
    assert_eq!(
        prediction.get_str("rephrased_query"),
        Some("What is the refund policy for damaged items?")
    );

    let entries = logger.entries(names::REPHRASER);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tokens, Some(70));
    assert_eq!(entries[0].cost, Some(Decimal::new(2, 4)));
    assert_eq!(entries[0].messages.len(), 4);
    assert_eq!(entries[0].outputs.len(), 2);
    assert!(suite.lm().history().is_empty());
}
