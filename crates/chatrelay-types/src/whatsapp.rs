//! WhatsApp Cloud API wire types.
//!
//! Inbound: the webhook notification body (`entry[].changes[].value.messages[]`).
//! Only the fields the relay reads are modelled; everything else the platform
//! sends is ignored by serde.
//!
//! Outbound: the `/{phone_number_id}/messages` request body for plain text and
//! interactive reply-button messages.

use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::message::{ButtonMenu, InboundMessage, MenuButton, MessageKind};
use crate::session::SenderId;

// ---------------------------------------------------------------------------
// Inbound webhook notification
// ---------------------------------------------------------------------------

/// Top-level webhook notification body.
///
/// `entry` is required: a body without it is a [`EventError::Malformed`] event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub value: ChangeValue,
}

/// The `value` object of a change. Status callbacks carry `statuses` and no
/// `messages`; those deserialize to an empty `messages` list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<WaMessage>,
}

/// A single message inside a change value.
///
/// `from` and `type` are optional here so one incomplete message cannot fail
/// the whole notification; [`WaMessage::to_inbound`] rejects it instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<WaText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive: Option<WaInteractive>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaText {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaInteractive {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<WaButtonReply>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaButtonReply {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl WebhookPayload {
    /// Parse a raw webhook body.
    pub fn from_slice(body: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(body).map_err(|e| EventError::Malformed(e.to_string()))
    }

    /// Every message across all entries and changes, in delivery order.
    pub fn messages(&self) -> impl Iterator<Item = &WaMessage> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .flat_map(|change| change.value.messages.iter())
    }
}

impl WaMessage {
    /// Convert to the channel-independent [`InboundMessage`].
    ///
    /// A message without a sender or type, or a `text` message without a
    /// `text.body`, is malformed. Interactive messages other than reply-button
    /// taps (lists, flows) are reported as unsupported rather than malformed.
    pub fn to_inbound(&self) -> Result<InboundMessage, EventError> {
        let from = self
            .from
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| EventError::Malformed("message without sender".to_string()))?;
        let message_type = self
            .kind
            .as_deref()
            .ok_or_else(|| EventError::Malformed("message without type".to_string()))?;

        let sender = SenderId(from.to_string());
        let kind = match message_type {
            "text" => {
                let text = self.text.as_ref().ok_or_else(|| {
                    EventError::Malformed("text message without text.body".to_string())
                })?;
                MessageKind::Text {
                    body: text.body.clone(),
                }
            }
            "interactive" => match self
                .interactive
                .as_ref()
                .and_then(|i| i.button_reply.as_ref())
            {
                Some(reply) => MessageKind::ButtonReply {
                    id: reply.id.clone(),
                },
                None => MessageKind::Unsupported {
                    kind: "interactive".to_string(),
                },
            },
            other => MessageKind::Unsupported {
                kind: other.to_string(),
            },
        };
        Ok(InboundMessage { sender, kind })
    }
}

// ---------------------------------------------------------------------------
// Outbound send request
// ---------------------------------------------------------------------------

/// Request body for `POST /{phone_number_id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub messaging_product: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive: Option<InteractiveBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractiveBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub body: InteractiveText,
    pub action: InteractiveAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractiveText {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractiveAction {
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    pub kind: String,
    pub reply: MenuButton,
}

impl SendMessageRequest {
    const PRODUCT: &'static str = "whatsapp";

    /// Plain text message.
    pub fn text(to: &SenderId, body: &str) -> Self {
        Self {
            messaging_product: Self::PRODUCT.to_string(),
            to: to.0.clone(),
            kind: "text".to_string(),
            text: Some(TextBody {
                body: body.to_string(),
            }),
            interactive: None,
        }
    }

    /// Interactive reply-button message.
    pub fn button_menu(to: &SenderId, menu: &ButtonMenu) -> Self {
        Self {
            messaging_product: Self::PRODUCT.to_string(),
            to: to.0.clone(),
            kind: "interactive".to_string(),
            text: None,
            interactive: Some(InteractiveBody {
                kind: "button".to_string(),
                body: InteractiveText {
                    text: menu.body.clone(),
                },
                action: InteractiveAction {
                    buttons: menu
                        .buttons
                        .iter()
                        .map(|b| ReplyButton {
                            kind: "reply".to_string(),
                            reply: b.clone(),
                        })
                        .collect(),
                },
            }),
        }
    }
}
