pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod state;

use axum::http::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{
    CACHE_HEADER, CACHE_KEY_HEADER, ERROR_HEADER, MODE_HEADER, MODEL_HEADER, PROVIDER_HEADER,
    REQUESTED_PROVIDER_HEADER, SIMULATION_HEADER, chat_handler, health_handler, metrics_handler,
    models_handler, personas_handler, providers_handler,
};
use crate::state::AppState;

// headers the browser UI needs to read off chat responses
const EXPOSED_HEADERS: [&str; 8] = [
    PROVIDER_HEADER,
    REQUESTED_PROVIDER_HEADER,
    MODEL_HEADER,
    MODE_HEADER,
    SIMULATION_HEADER,
    CACHE_HEADER,
    CACHE_KEY_HEADER,
    ERROR_HEADER,
];

// Build the HTTP router with every route wired to `state`.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(EXPOSED_HEADERS.map(HeaderName::from_static));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/providers", get(providers_handler))
        .route("/api/models", get(models_handler))
        .route("/api/personas", get(personas_handler))
        .layer(cors)
        .with_state(state)
}
