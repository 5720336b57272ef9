use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::state::AppState;

// health handler, polled by the UI to show its "backend offline" banner
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "simulation": state.router.is_simulating(),
        "cache_entries": state.cache.len()
    }))
}
