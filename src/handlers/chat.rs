use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use crate::cache::make_cache_key;
use crate::error::GatewayError;
use crate::metrics::{
    CACHE_HITS, CACHE_MISSES, CACHE_SIZE, PROVIDER_ERRORS, REQUEST_LATENCY, REQUEST_TOTAL,
    SIMULATED_RESPONSES,
};
use crate::models::{ChatRequest, ChatRequestBody};
use crate::providers::ProviderId;
use crate::state::AppState;

pub const PROVIDER_HEADER: &str = "x-provider";
pub const REQUESTED_PROVIDER_HEADER: &str = "x-requested-provider";
pub const MODEL_HEADER: &str = "x-model";
pub const MODE_HEADER: &str = "x-mode";
pub const SIMULATION_HEADER: &str = "x-simulation-mode";
pub const CACHE_HEADER: &str = "x-cache";
pub const CACHE_KEY_HEADER: &str = "x-cache-key";
pub const ERROR_HEADER: &str = "x-error";

// everything the response headers report
struct ReplyMeta<'a> {
    requested: ProviderId,
    provider: ProviderId,
    model: &'a str,
    mode: &'static str,
    simulated: bool,
    cache_hit: bool,
    cache_key: &'a str,
    error: bool,
}

fn reply(meta: ReplyMeta<'_>, text: String) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(PROVIDER_HEADER, HeaderValue::from_static(meta.provider.as_str()));
    if meta.provider != meta.requested {
        headers.insert(
            REQUESTED_PROVIDER_HEADER,
            HeaderValue::from_static(meta.requested.as_str()),
        );
    }
    // model names come from callers; skip the header rather than fail on odd bytes
    if let Ok(model) = HeaderValue::from_str(meta.model) {
        headers.insert(MODEL_HEADER, model);
    }
    headers.insert(MODE_HEADER, HeaderValue::from_static(meta.mode));
    headers.insert(
        SIMULATION_HEADER,
        HeaderValue::from_static(if meta.simulated { "true" } else { "false" }),
    );
    headers.insert(
        CACHE_HEADER,
        HeaderValue::from_static(if meta.cache_hit { "HIT" } else { "MISS" }),
    );
    if let Ok(key) = HeaderValue::from_str(meta.cache_key) {
        headers.insert(CACHE_KEY_HEADER, key);
    }
    if meta.error {
        headers.insert(ERROR_HEADER, HeaderValue::from_static("true"));
    }

    // the router has already buffered everything, so this is a one-chunk stream
    let body = Body::from_stream(stream::iter([Ok::<_, Infallible>(text)]));
    (StatusCode::OK, headers, body).into_response()
}

// POST /api/chat
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let Json(body) = payload.map_err(|e| GatewayError::malformed(e.body_text()))?;
    let request = ChatRequest::try_from(body)?;

    if !state.router.accepts(request.provider) {
        return Err(GatewayError::UnsupportedProvider(request.provider.to_string()));
    }

    let cache_key = make_cache_key(&request);

    // check cache first
    if let Some(text) = state.cache.get(&cache_key) {
        CACHE_HITS.inc();
        tracing::info!(provider = %request.provider, key = %cache_key, "cache HIT");
        let (provider, model) = state.router.plan(&request);
        let response = reply(
            ReplyMeta {
                requested: request.provider,
                provider,
                model: &model,
                mode: request.mode.as_str(),
                simulated: state.router.is_simulating(),
                cache_hit: true,
                cache_key: &cache_key,
                error: false,
            },
            text,
        );
        REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
        return Ok(response);
    }
    CACHE_MISSES.inc();
    tracing::info!(provider = %request.provider, key = %cache_key, "cache MISS - routing");

    let outcome = state.router.route(&request).await;

    if outcome.error {
        PROVIDER_ERRORS.inc();
    } else if outcome.text.is_empty() {
        tracing::warn!(provider = %outcome.provider, "provider returned no text, not caching");
    } else {
        // saving to cache, only complete answers
        state.cache.put(cache_key.clone(), outcome.text.clone());
    }
    CACHE_SIZE.set(state.cache.len() as f64);
    if outcome.simulated {
        SIMULATED_RESPONSES.inc();
    }

    let response = reply(
        ReplyMeta {
            requested: outcome.requested,
            provider: outcome.provider,
            model: &outcome.model,
            mode: request.mode.as_str(),
            simulated: outcome.simulated,
            cache_hit: false,
            cache_key: &cache_key,
            error: outcome.error,
        },
        outcome.text,
    );

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    Ok(response)
}
