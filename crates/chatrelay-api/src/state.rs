//! Application state wiring the conversation service to its infrastructure.
//!
//! `ConversationService` is generic over the session store and dispatcher;
//! `AppState` pins it to the in-memory store and the WhatsApp dispatcher.

use std::sync::Arc;

use secrecy::SecretString;

use chatrelay_core::service::ConversationService;
use chatrelay_core::session::InMemorySessionStore;
use chatrelay_infra::llm::build_backends;
use chatrelay_infra::whatsapp::WhatsAppDispatcher;
use chatrelay_types::config::RelayConfig;

pub type ConcreteConversationService = ConversationService<InMemorySessionStore, WhatsAppDispatcher>;

/// Shared state handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConcreteConversationService>,
    /// Token expected in the subscription handshake.
    pub verify_token: Arc<SecretString>,
    /// App secret for `X-Hub-Signature-256`; `None` skips verification.
    pub app_secret: Option<Arc<SecretString>>,
}

impl AppState {
    /// Build the store, backends and dispatcher from `config`.
    pub fn init(config: &RelayConfig) -> anyhow::Result<Self> {
        let store = Arc::new(InMemorySessionStore::new(config.routing.default_backend));
        let backends = build_backends(config)?;
        let dispatcher = WhatsAppDispatcher::from_config(&config.whatsapp)?;

        let service =
            ConversationService::new(store, backends, dispatcher).with_routing(&config.routing);

        if config.whatsapp.verify_token.is_empty() {
            tracing::warn!("WHATSAPP_VERIFY_TOKEN is not set; webhook verification will be refused");
        }
        if config.whatsapp.app_secret.is_none() {
            tracing::info!("no app secret configured, inbound signatures are not checked");
        }

        Ok(Self {
            service: Arc::new(service),
            verify_token: Arc::new(SecretString::from(config.whatsapp.verify_token.clone())),
            app_secret: config
                .whatsapp
                .app_secret
                .clone()
                .map(|s| Arc::new(SecretString::from(s))),
        })
    }
}
