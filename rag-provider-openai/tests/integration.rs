//! Integration tests for the OpenAI-compatible provider using wiremock.

use rag_provider_openai::OpenAiProvider;
use rag_turn::{Provider, ProviderError, ProviderMessage, ProviderRequest, StopReason};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn minimal_request() -> ProviderRequest {
    ProviderRequest::new(vec![
        ProviderMessage::system("Answer briefly."),
        ProviderMessage::user("Hello"),
    ])
}

fn success_response_body() -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Hello! How can I help?"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 10, "total_tokens": 30}
    })
}

#[tokio::test]
async fn complete_sends_to_chat_completions_with_bearer_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(bearer_token("gsk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama-3.3-70b-versatile",
            "messages": [
                {"role": "system", "content": "Answer briefly."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_response_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::groq("gsk-test").with_base_url(mock_server.uri());

    let result = provider.complete(minimal_request()).await;
    assert!(result.is_ok(), "expected Ok, got: {:?}", result.err());

    let resp = result.expect("already checked");
    assert_eq!(resp.model, "llama-3.3-70b-versatile");
    assert_eq!(resp.outputs, vec!["Hello! How can I help?".to_string()]);
    assert_eq!(resp.stop_reason, StopReason::EndTurn);
    assert_eq!(resp.usage.input_tokens, 20);
    assert_eq!(resp.usage.output_tokens, 10);
    assert_eq!(resp.usage.total(), 30);
    assert!(resp.cost.is_some());
}

#[tokio::test]
async fn complete_returns_every_choice() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "choices": [
                {"message": {"role": "assistant", "content": "one"}, "finish_reason": "stop"},
                {"message": {"role": "assistant", "content": "two"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        })))
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new("sk-test").with_base_url(mock_server.uri());
    let resp = provider.complete(minimal_request()).await.unwrap();
    assert_eq!(resp.outputs, vec!["one".to_string(), "two".to_string()]);
}

#[tokio::test]
async fn unauthorized_maps_to_auth_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new("bad").with_base_url(mock_server.uri());
    let err = provider.complete(minimal_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthFailed(ref body) if body.contains("invalid")));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new("sk-test").with_base_url(mock_server.uri());
    let err = provider.complete(minimal_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RateLimited));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let provider = OpenAiProvider::new("sk-test").with_base_url(mock_server.uri());
    let err = provider.complete(minimal_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_server_is_request_failure() {
    // Nothing listens on port 9 (discard) on CI machines.
    let provider = OpenAiProvider::new("sk-test").with_base_url("http://127.0.0.1:9");
    let err = provider.complete(minimal_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
}
