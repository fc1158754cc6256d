//! GET /health - liveness probe with a few runtime facts.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let service = &state.service;
    let backends: Vec<String> = service
        .router()
        .backends()
        .available()
        .into_iter()
        .map(|b| b.to_string())
        .collect();

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "input_mode": service.input_mode().to_string(),
        "backends": backends,
        "sessions": service.store().len(),
    }))
}
