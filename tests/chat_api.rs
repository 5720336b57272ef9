use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use futures::stream;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use omnichat_gateway::app;
use omnichat_gateway::cache::ResponseCache;
use omnichat_gateway::error::ProviderResult;
use omnichat_gateway::prompts::SIMULATION_NOTICE;
use omnichat_gateway::providers::{ChatBackend, Credentials, ProviderCall, ProviderId, TextStream};
use omnichat_gateway::router::{ProviderRouter, UnsupportedProviderPolicy};
use omnichat_gateway::state::AppState;

// Answers every call with fixed chunks and remembers what it was asked.
#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<ProviderCall>>,
    // finish the stream without sending any text
    silent: bool,
}

impl FakeBackend {
    fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn stream_chat(&self, call: &ProviderCall) -> ProviderResult<TextStream> {
        self.calls.lock().unwrap().push(call.clone());
        if self.silent {
            return Ok(Box::pin(stream::empty()));
        }
        let chunks: Vec<ProviderResult<String>> = vec![
            Ok("Recursion is ".to_string()),
            Ok("a function calling itself.".to_string()),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

fn build(
    credentials: Credentials,
    backend: Arc<FakeBackend>,
    policy: UnsupportedProviderPolicy,
) -> Router {
    let router = ProviderRouter::new(credentials, backend, ProviderId::Groq, policy);
    app(Arc::new(AppState::new(ResponseCache::default(), router)))
}

fn groq_only() -> Credentials {
    Credentials::from_pairs([(ProviderId::Groq, "gsk_test_key")])
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_chat(app: &Router, body: Value) -> (StatusCode, HeaderMap, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, HeaderMap, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn recursion() -> Value {
    json!({
        "messages": [{"role": "user", "content": "Explain recursion"}],
        "provider": "groq",
        "mode": "default"
    })
}

#[tokio::test]
async fn simulated_answer_then_cache_hit() {
    let backend = Arc::new(FakeBackend::default());
    let app = build(Credentials::default(), backend.clone(), UnsupportedProviderPolicy::Fallback);

    let (status, headers, first) = post_chat(&app, recursion()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(first.starts_with("Here's a response to your query about \"Explain recursion..."));
    assert!(first.ends_with(SIMULATION_NOTICE));
    assert_eq!(header(&headers, "x-simulation-mode"), Some("true"));
    assert_eq!(header(&headers, "x-cache"), Some("MISS"));
    assert_eq!(header(&headers, "x-provider"), Some("groq"));
    assert_eq!(header(&headers, "x-mode"), Some("default"));
    assert!(header(&headers, "x-error").is_none());
    let key = header(&headers, "x-cache-key").unwrap().to_string();

    let (status, headers, second) = post_chat(&app, recursion()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header(&headers, "x-cache"), Some("HIT"));
    assert_eq!(header(&headers, "x-cache-key"), Some(key.as_str()));
    assert_eq!(second, first);

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn routed_answer_is_cached() {
    let backend = Arc::new(FakeBackend::default());
    let app = build(groq_only(), backend.clone(), UnsupportedProviderPolicy::Fallback);

    let (_, headers, first) = post_chat(&app, recursion()).await;
    assert_eq!(first, "Recursion is a function calling itself.");
    assert_eq!(header(&headers, "x-simulation-mode"), Some("false"));
    assert_eq!(header(&headers, "x-model"), Some("llama-3.1-8b-instant"));

    let (_, headers, second) = post_chat(&app, recursion()).await;
    assert_eq!(header(&headers, "x-cache"), Some("HIT"));
    assert_eq!(second, first);
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn unimplemented_provider_falls_back_to_default() {
    let backend = Arc::new(FakeBackend::default());
    let app = build(groq_only(), backend.clone(), UnsupportedProviderPolicy::Fallback);

    let (status, headers, _) = post_chat(
        &app,
        json!({
            "messages": [{"role": "user", "content": "Who made you?"}],
            "provider": "xai",
            "mode": "default"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(header(&headers, "x-provider"), Some("groq"));
    assert_eq!(header(&headers, "x-requested-provider"), Some("xai"));

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].provider, ProviderId::Groq);
    assert!(calls[0].system_prompt.contains("xai"));
}

#[tokio::test]
async fn reject_policy_refuses_unimplemented_provider() {
    let backend = Arc::new(FakeBackend::default());
    let app = build(groq_only(), backend.clone(), UnsupportedProviderPolicy::Reject);

    let (status, _, body) = post_chat(
        &app,
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "provider": "xai",
            "mode": "default"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("xai"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn missing_key_is_reported_in_body_and_not_cached() {
    let backend = Arc::new(FakeBackend::default());
    let app = build(groq_only(), backend.clone(), UnsupportedProviderPolicy::Fallback);
    let ask_claude = json!({
        "messages": [{"role": "user", "content": "hi"}],
        "provider": "anthropic",
        "mode": "document"
    });

    let (status, headers, body) = post_chat(&app, ask_claude.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header(&headers, "x-error"), Some("true"));
    assert!(body.contains("Anthropic"));
    assert!(body.contains("ANTHROPIC_API_KEY"));

    let (_, headers, _) = post_chat(&app, ask_claude).await;
    assert_eq!(header(&headers, "x-cache"), Some("MISS"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn empty_answer_is_not_cached() {
    let backend = Arc::new(FakeBackend {
        silent: true,
        ..Default::default()
    });
    let app = build(groq_only(), backend.clone(), UnsupportedProviderPolicy::Fallback);

    let (status, headers, body) = post_chat(&app, recursion()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(header(&headers, "x-cache"), Some("MISS"));

    let (_, headers, _) = post_chat(&app, recursion()).await;
    assert_eq!(header(&headers, "x-cache"), Some("MISS"));
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn malformed_requests_get_400() {
    let backend = Arc::new(FakeBackend::default());
    let app = build(groq_only(), backend.clone(), UnsupportedProviderPolicy::Fallback);

    let (status, _, body) = post_chat(
        &app,
        json!({"messages": [{"role": "user", "content": "hi"}], "provider": "groq"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("mode"));

    let (status, _, _) = post_chat(&app, json!({"provider": "groq", "mode": "default"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let broken = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = send(&app, broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn catalog_endpoints() {
    let app = build(groq_only(), Arc::new(FakeBackend::default()), UnsupportedProviderPolicy::Fallback);

    let (status, _, body) = get(&app, "/api/providers").await;
    assert_eq!(status, StatusCode::OK);
    let providers: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(providers.len(), 12);
    let groq = providers.iter().find(|p| p["id"] == "groq").unwrap();
    assert_eq!(groq["default"], true);
    assert_eq!(groq["configured"], true);
    let xai = providers.iter().find(|p| p["id"] == "xai").unwrap();
    assert_eq!(xai["implemented"], false);

    let (status, _, body) = get(&app, "/api/models?provider=anthropic").await;
    assert_eq!(status, StatusCode::OK);
    let models: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert!(models.iter().any(|m| m["id"] == "claude-3-haiku-20240307" && m["default"] == true));

    let (status, _, _) = get(&app, "/api/models?provider=skynet").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, body) = get(&app, "/api/personas").await;
    assert_eq!(status, StatusCode::OK);
    let personas: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(personas.len(), 15);
    for id in ["default", "creative", "expert", "coach", "debater", "strategist", "designer", "interviewer", "custom"] {
        assert!(personas.iter().any(|p| p["id"] == id), "missing persona {id}");
    }
    let custom = personas.iter().find(|p| p["id"] == "custom").unwrap();
    assert_eq!(custom["prompt"], "");

    let (status, _, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["simulation"], false);
}
