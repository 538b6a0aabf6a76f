use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Liveness plus the configured provider order. Does not probe upstreams.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let providers: Vec<&str> = state
        .resolver
        .provider_order()
        .iter()
        .map(|p| p.id())
        .collect();
    Json(json!({
        "status": "ok",
        "providers": providers,
    }))
}
