use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use legalassist_common::{LegalAssistError, ModelConfig};
use legalassist_llm::{
    CohereClient, GenerationOptions, ModelGateway, RetryGateway, TimeoutGateway,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn config(server: &MockServer) -> ModelConfig {
    ModelConfig {
        api_key: "sk-test".to_string(),
        base_url: server.uri(),
        model: "command-light".to_string(),
        ..ModelConfig::default()
    }
}

fn generation(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "gen-1",
        "generations": [{ "id": "g-1", "text": text }],
        "prompt": "ignored"
    }))
}

/// Fails with 503 a fixed number of times, then succeeds
struct FlakyResponder {
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            ResponseTemplate::new(503).set_body_json(json!({ "message": "overloaded" }))
        } else {
            generation("recovered")
        }
    }
}

#[tokio::test]
async fn cohere_sends_prompt_and_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "command-light",
            "prompt": "What is a tort?",
            "max_tokens": 300
        })))
        .respond_with(generation("A civil wrong."))
        .expect(1)
        .mount(&server)
        .await;

    let client = CohereClient::new(&config(&server)).unwrap();
    let text = client
        .generate("What is a tort?", &GenerationOptions::new(0.7, 300))
        .await
        .unwrap();

    assert_eq!(text, "A civil wrong.");
}

#[tokio::test]
async fn cohere_empty_generation_is_model_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generations": [] })))
        .mount(&server)
        .await;

    let client = CohereClient::new(&config(&server)).unwrap();
    let err = client
        .generate("prompt", &GenerationOptions::new(0.1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, LegalAssistError::Model(_)));
}

#[tokio::test]
async fn retry_gateway_recovers_from_server_errors() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(FlakyResponder {
            failures: 2,
            calls: calls.clone(),
        })
        .mount(&server)
        .await;

    let client = CohereClient::new(&config(&server)).unwrap();
    let gateway = RetryGateway::new(client, 2, Duration::from_millis(5));

    let text = gateway
        .generate("prompt", &GenerationOptions::new(0.1, 10))
        .await
        .unwrap();

    assert_eq!(text, "recovered");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_gateway_does_not_repeat_rejected_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid api token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = CohereClient::new(&config(&server)).unwrap();
    let gateway = RetryGateway::new(client, 3, Duration::from_millis(5));

    let err = gateway
        .generate("prompt", &GenerationOptions::new(0.1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, LegalAssistError::ModelRejected(_)));
    assert!(err.to_string().contains("invalid api token"));
}

#[tokio::test]
async fn timeout_gateway_bounds_slow_responses() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/generate"))
        .respond_with(generation("late").set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = CohereClient::new(&config(&server)).unwrap();
    let gateway = TimeoutGateway::new(client, Duration::from_millis(100));

    let err = gateway
        .generate("prompt", &GenerationOptions::new(0.1, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, LegalAssistError::Timeout(_)));
    assert!(err.is_model_failure());
}
