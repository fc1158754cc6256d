//! Channel-independent message types.
//!
//! `InboundMessage` is what the routing core sees after the WhatsApp webhook
//! payload has been unpacked; `ButtonMenu` is what it asks the dispatcher to
//! render as an interactive message.

use serde::{Deserialize, Serialize};

use crate::session::SenderId;

/// Button id that selects the Gemini backend.
pub const BUTTON_MODEL_GEMINI: &str = "model_gemini";

/// Button id that selects the Ollama backend.
pub const BUTTON_MODEL_OLLAMA: &str = "model_ollama";

/// Button id that clears the sender's history.
pub const BUTTON_RESET_MEMORY: &str = "reset_memory";

/// What kind of message arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    /// Free text typed by the user.
    Text { body: String },
    /// A tap on an interactive reply button.
    ButtonReply { id: String },
    /// Anything else the platform delivers (image, audio, location, ...).
    Unsupported { kind: String },
}

/// A single inbound message from one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub sender: SenderId,
    pub kind: MessageKind,
}

impl InboundMessage {
    pub fn text(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: SenderId(sender.into()),
            kind: MessageKind::Text { body: body.into() },
        }
    }

    pub fn button(sender: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sender: SenderId(sender.into()),
            kind: MessageKind::ButtonReply { id: id.into() },
        }
    }
}

/// One reply button in an interactive menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuButton {
    pub id: String,
    pub title: String,
}

impl MenuButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Interactive button message: a body text and an ordered list of buttons.
///
/// WhatsApp renders at most three reply buttons per message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonMenu {
    pub body: String,
    pub buttons: Vec<MenuButton>,
}
