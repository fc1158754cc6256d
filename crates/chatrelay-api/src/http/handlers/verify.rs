//! GET / - WhatsApp subscription verification handshake.
//!
//! Meta calls this once when the webhook is registered. The challenge is
//! echoed only when `hub.mode` is `subscribe` and `hub.verify_token` matches
//! the configured token.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

pub async fn verify_subscription(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> (StatusCode, String) {
    let expected = state.verify_token.expose_secret();
    let token_matches = !expected.is_empty() && params.verify_token.as_deref() == Some(expected);

    if params.mode.as_deref() == Some("subscribe") && token_matches {
        tracing::info!("webhook subscription verified");
        return (StatusCode::OK, params.challenge.unwrap_or_default());
    }

    tracing::warn!(mode = ?params.mode, "webhook verification refused");
    (StatusCode::FORBIDDEN, "Unauthorized".to_string())
}
