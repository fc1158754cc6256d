//! Axum router configuration.
//!
//! - `GET /`: subscription verification handshake
//! - `POST /`: webhook deliveries
//! - `GET /health`: liveness probe

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::verify::verify_subscription).post(handlers::webhook::receive_webhook),
        )
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
