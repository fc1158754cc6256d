//! Command classification for inbound messages.
//!
//! Decides, for a single inbound message, whether it switches the backend,
//! clears memory, asks for the model menu, or is content for the backend.
//! Classification is pure: it reads the message, the input mode and whether
//! the sender already picked a model, and never touches the store.

use chatrelay_types::config::InputMode;
use chatrelay_types::error::CommandError;
use chatrelay_types::message::{
    BUTTON_MODEL_GEMINI, BUTTON_MODEL_OLLAMA, BUTTON_RESET_MEMORY, InboundMessage, MessageKind,
};
use chatrelay_types::session::Backend;

/// Prefix of the text model-switch command (matched on the lower-cased body).
const MODEL_COMMAND_PREFIX: &str = "/model ";

/// Bodies (lower-cased, trimmed) that clear the sender's memory.
const RESET_KEYWORDS: [&str; 3] = ["/reset", "reset", "clear"];

/// What to do with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store the sender's backend choice and acknowledge it.
    SelectModel(Backend),
    /// `/model <token>` with an unknown token. Nothing is mutated.
    InvalidModel(CommandError),
    /// Clear history; `show_menu` re-sends the model selection menu afterwards.
    ResetMemory { show_menu: bool },
    /// The sender has not picked a model yet (button mode): send the menu.
    ShowModelMenu,
    /// Ordinary content, trimmed but with the user's original casing.
    Content(String),
    /// Nothing to do (unknown button, empty text, unsupported message type).
    Ignore(String),
}

/// Classify `message`. First matching rule wins.
pub fn classify(message: &InboundMessage, mode: InputMode, has_selection: bool) -> Command {
    match &message.kind {
        MessageKind::ButtonReply { id } => classify_button(id),
        MessageKind::Text { body } => classify_text(body, mode, has_selection),
        MessageKind::Unsupported { kind } => Command::Ignore(format!("unsupported message type '{kind}'")),
    }
}

fn classify_button(id: &str) -> Command {
    match id {
        BUTTON_MODEL_GEMINI => Command::SelectModel(Backend::Gemini),
        BUTTON_MODEL_OLLAMA => Command::SelectModel(Backend::Ollama),
        BUTTON_RESET_MEMORY => Command::ResetMemory { show_menu: true },
        other => Command::Ignore(format!("unknown button id '{other}'")),
    }
}

fn classify_text(body: &str, mode: InputMode, has_selection: bool) -> Command {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Command::Ignore("empty text".to_string());
    }

    let normalized = trimmed.to_lowercase();

    if let Some(token) = normalized.strip_prefix(MODEL_COMMAND_PREFIX) {
        return match parse_model_token(token) {
            Ok(backend) => Command::SelectModel(backend),
            Err(e) => Command::InvalidModel(e),
        };
    }

    if RESET_KEYWORDS.contains(&normalized.as_str()) {
        return Command::ResetMemory { show_menu: false };
    }

    if mode == InputMode::Buttons && !has_selection {
        return Command::ShowModelMenu;
    }

    Command::Content(trimmed.to_string())
}

/// Parse the argument of `/model`. Only `gemini` and `ollama` are accepted.
pub fn parse_model_token(token: &str) -> Result<Backend, CommandError> {
    let token = token.trim();
    token
        .parse::<Backend>()
        .map_err(|_| CommandError::InvalidModelSelection(token.to_string()))
}
