//! POST / - WhatsApp webhook deliveries.
//!
//! The handler answers `200 ok` immediately for every delivery. Accepted
//! payloads are handled on a spawned task; a bad signature or malformed body
//! is logged and dropped. Meta retries anything that is not a 200, so errors
//! never change the response.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use tracing::Instrument;
use uuid::Uuid;

use chatrelay_infra::signature::{SIGNATURE_HEADER, verify_signature_header};
use chatrelay_types::whatsapp::WebhookPayload;

use crate::state::AppState;

const ACK: (StatusCode, &str) = (StatusCode::OK, "ok");

pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let request_id = Uuid::now_v7();

    let Some(payload) = accept_delivery(&state, &headers, &body, request_id) else {
        return ACK;
    };

    let service = Arc::clone(&state.service);
    let span = tracing::info_span!("delivery", %request_id);
    tokio::spawn(
        async move {
            let outcomes = service.handle_payload(&payload).await;
            tracing::debug!(?outcomes, "delivery handled");
        }
        .instrument(span),
    );

    ACK
}

/// Verify and parse a delivery. `None` means it was logged and dropped.
fn accept_delivery(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    request_id: Uuid,
) -> Option<WebhookPayload> {
    if let Some(secret) = &state.app_secret {
        let header = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if let Err(e) = verify_signature_header(secret.expose_secret().as_bytes(), body, header) {
            tracing::warn!(%request_id, error = %e, "dropping webhook delivery");
            return None;
        }
    }

    match WebhookPayload::from_slice(body) {
        Ok(payload) => {
            tracing::debug!(%request_id, messages = payload.messages().count(), "webhook delivery accepted");
            Some(payload)
        }
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "dropping webhook delivery");
            None
        }
    }
}
