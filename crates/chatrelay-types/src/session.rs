//! Per-sender conversation state: senders, turns and backend selection.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a chat participant (the WhatsApp phone number).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(pub String);

impl SenderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SenderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Bot,
}

impl TurnRole {
    /// Capitalized label used in context transcripts ("User", "Bot").
    pub fn label(&self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Bot => "Bot",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Bot => write!(f, "bot"),
        }
    }
}

/// One message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Bot,
            content: content.into(),
        }
    }

    /// Render as a transcript line: `"<Role>: <content>"`.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

/// Text-generation backend a sender can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Gemini,
    Ollama,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Gemini, Backend::Ollama];

    /// Human-facing name used in acknowledgements and menu titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Gemini => "Gemini",
            Backend::Ollama => "Ollama",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Gemini => write!(f, "gemini"),
            Backend::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Backend::Gemini),
            "ollama" => Ok(Backend::Ollama),
            other => Err(format!("invalid backend: '{other}'")),
        }
    }
}

/// Everything the store keeps for one sender.
///
/// `model` is `None` until the sender makes an explicit selection; readers
/// that need a concrete backend fall back to the configured default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub history: Vec<Turn>,
    pub model: Option<Backend>,
}

impl SessionState {
    /// The last `n` turns in conversational order.
    pub fn last_n(&self, n: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}
