//! Conversation service: one inbound message in, actions out.
//!
//! `ConversationService` classifies each message, applies the resulting
//! command to the session store, routes content through the
//! [`ResponseRouter`] and sends acknowledgements, replies and menus through
//! the [`Dispatcher`].
//!
//! Failure policy:
//! - delivery errors are logged and never retried or propagated
//! - backend errors are logged and the sender gets no reply for that turn
//! - store errors propagate to the caller as [`RelayError::Repository`]

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use chatrelay_types::config::{InputMode, RoutingConfig};
use chatrelay_types::error::{BackendError, RelayError};
use chatrelay_types::message::{ButtonMenu, InboundMessage};
use chatrelay_types::session::{Backend, SenderId};
use chatrelay_types::whatsapp::WebhookPayload;

use crate::backend::BackendRegistry;
use crate::classifier::{self, Command};
use crate::dispatch::Dispatcher;
use crate::menu;
use crate::router::ResponseRouter;
use crate::session::SessionStore;

/// What handling a message amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ModelSelected(Backend),
    InvalidModel(String),
    MemoryReset,
    MenuShown,
    Replied(String),
    /// The backend failed; nothing was sent to the sender.
    BackendFailed,
    Ignored,
}

/// Orchestrates classification, state changes, routing and dispatch.
///
/// Generic over `SessionStore` and `Dispatcher` so core never depends on
/// infra; the API layer pins both to concrete types.
pub struct ConversationService<S: SessionStore, D: Dispatcher> {
    store: Arc<S>,
    router: ResponseRouter<S>,
    dispatcher: D,
    mode: InputMode,
}

impl<S: SessionStore, D: Dispatcher> ConversationService<S, D> {
    pub fn new(store: Arc<S>, backends: BackendRegistry, dispatcher: D) -> Self {
        Self {
            router: ResponseRouter::new(Arc::clone(&store), backends),
            store,
            dispatcher,
            mode: InputMode::default(),
        }
    }

    pub fn with_input_mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Apply input mode, context window and timeout from `[routing]`.
    pub fn with_routing(mut self, routing: &RoutingConfig) -> Self {
        self.mode = routing.input_mode;
        self.router = self
            .router
            .with_context_turns(routing.context_turns)
            .with_timeout(Duration::from_secs(routing.backend_timeout_secs));
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn router(&self) -> &ResponseRouter<S> {
        &self.router
    }

    pub fn input_mode(&self) -> InputMode {
        self.mode
    }

    /// Handle every message in a webhook notification, in delivery order.
    ///
    /// Malformed messages are logged and skipped; one failing message never
    /// prevents the rest from being handled.
    pub async fn handle_payload(&self, payload: &WebhookPayload) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        for raw in payload.messages() {
            let message = match raw.to_inbound() {
                Ok(m) => m,
                Err(e) => {
                    warn!(from = ?raw.from, error = %e, "skipping malformed message");
                    continue;
                }
            };
            match self.handle(&message).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!(sender = %message.sender, error = %e, "failed to handle message"),
            }
        }
        outcomes
    }

    /// Handle a single inbound message.
    pub async fn handle(&self, message: &InboundMessage) -> Result<Outcome, RelayError> {
        let sender = &message.sender;
        let has_selection = self.store.selected_model(sender).await?.is_some();
        let command = classifier::classify(message, self.mode, has_selection);
        debug!(%sender, ?command, "classified message");

        let outcome = match command {
            Command::SelectModel(backend) => {
                self.store.set_model(sender, backend).await?;
                info!(%sender, %backend, "model selected");
                self.deliver_text(sender, &menu::model_selected_text(backend)).await;
                Outcome::ModelSelected(backend)
            }
            Command::InvalidModel(e) => {
                info!(%sender, error = %e, "rejected model selection");
                self.deliver_text(sender, menu::INVALID_MODEL_TEXT).await;
                Outcome::InvalidModel(e.to_string())
            }
            Command::ResetMemory { show_menu } => {
                self.store.reset_history(sender).await?;
                info!(%sender, "memory reset");
                if show_menu {
                    self.deliver_text(sender, menu::MEMORY_RESET_SELECT_TEXT).await;
                    self.deliver_menu(sender, &menu::model_selection_menu()).await;
                } else {
                    self.deliver_text(sender, menu::MEMORY_CLEARED_TEXT).await;
                }
                Outcome::MemoryReset
            }
            Command::ShowModelMenu => {
                self.deliver_menu(sender, &menu::model_selection_menu()).await;
                Outcome::MenuShown
            }
            Command::Content(text) => match self.router.respond(sender, &text).await {
                Ok(reply) => {
                    self.deliver_text(sender, &reply).await;
                    if self.mode == InputMode::Buttons {
                        self.deliver_menu(sender, &menu::post_response_menu()).await;
                    }
                    Outcome::Replied(reply)
                }
                Err(BackendError::Store(e)) => return Err(e.into()),
                Err(e) => {
                    error!(%sender, error = %e, "backend call failed, no reply sent");
                    Outcome::BackendFailed
                }
            },
            Command::Ignore(reason) => {
                debug!(%sender, %reason, "ignoring message");
                Outcome::Ignored
            }
        };

        Ok(outcome)
    }

    async fn deliver_text(&self, to: &SenderId, text: &str) {
        if let Err(e) = self.dispatcher.send_text(to, text).await {
            error!(%to, error = %e, "failed to deliver text message");
        }
    }

    async fn deliver_menu(&self, to: &SenderId, menu: &ButtonMenu) {
        if let Err(e) = self.dispatcher.send_button_menu(to, menu).await {
            error!(%to, error = %e, "failed to deliver button menu");
        }
    }
}
