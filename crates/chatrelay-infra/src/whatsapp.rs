//! WhatsAppDispatcher -- [`Dispatcher`] backed by the WhatsApp Cloud API.
//!
//! Every message is a `POST {api_base}/{phone_number_id}/messages` with
//! bearer authentication. The response status and body are logged; non-2xx
//! responses become [`DeliveryError::Rejected`].

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use chatrelay_core::dispatch::Dispatcher;
use chatrelay_types::config::WhatsAppConfig;
use chatrelay_types::error::DeliveryError;
use chatrelay_types::message::ButtonMenu;
use chatrelay_types::session::SenderId;
use chatrelay_types::whatsapp::SendMessageRequest;

/// Upper bound on one send API call.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct WhatsAppDispatcher {
    client: reqwest::Client,
    access_token: SecretString,
    api_base: String,
    phone_number_id: String,
}

impl WhatsAppDispatcher {
    pub fn new(client: reqwest::Client, config: &WhatsAppConfig) -> Self {
        if config.access_token.is_empty() || config.phone_number_id.is_empty() {
            tracing::warn!("WhatsApp access token or phone number id is not set; replies will be rejected");
        }
        Self {
            client,
            access_token: SecretString::from(config.access_token.clone()),
            api_base: config.api_base.clone(),
            phone_number_id: config.phone_number_id.clone(),
        }
    }

    /// Build a dispatcher with its own HTTP client.
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client, config))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/messages",
            self.api_base.trim_end_matches('/'),
            self.phone_number_id
        )
    }

    async fn post(&self, request: &SendMessageRequest) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.access_token.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::warn!(
                to = %request.to,
                kind = %request.kind,
                status = status.as_u16(),
                body = %body,
                "WhatsApp rejected message"
            );
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            to = %request.to,
            kind = %request.kind,
            status = status.as_u16(),
            body = %body,
            "WhatsApp message sent"
        );
        Ok(())
    }
}

impl Dispatcher for WhatsAppDispatcher {
    async fn send_text(&self, to: &SenderId, text: &str) -> Result<(), DeliveryError> {
        self.post(&SendMessageRequest::text(to, text)).await
    }

    async fn send_button_menu(&self, to: &SenderId, menu: &ButtonMenu) -> Result<(), DeliveryError> {
        self.post(&SendMessageRequest::button_menu(to, menu)).await
    }
}
