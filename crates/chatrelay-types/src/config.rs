//! Configuration types for chatrelay.
//!
//! `RelayConfig` mirrors `config.toml`. Every field has a default so an empty
//! file (or no file at all) yields a runnable configuration; secrets are
//! usually supplied through environment variables instead of the file.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::session::Backend;

/// How users drive model selection and memory reset.
///
/// Text commands (`/model <name>`, `/reset`) work in both modes. `Buttons`
/// additionally asks senders without a selection to pick a model from an
/// interactive menu, and offers a switch/reset menu after each reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Buttons,
    TextCommands,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Buttons => write!(f, "buttons"),
            InputMode::TextCommands => write!(f, "text_commands"),
        }
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buttons" => Ok(InputMode::Buttons),
            "text_commands" | "text" => Ok(InputMode::TextCommands),
            other => Err(format!("invalid input mode: '{other}'")),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5500
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// WhatsApp Cloud API credentials and endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Shared secret echoed during the subscription handshake.
    #[serde(default)]
    pub verify_token: String,
    /// Bearer token for the send API.
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// App secret for `X-Hub-Signature-256` verification. Unset disables the check.
    #[serde(default)]
    pub app_secret: Option<String>,
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            verify_token: String::new(),
            access_token: String::new(),
            phone_number_id: String::new(),
            api_base: default_api_base(),
            app_secret: None,
        }
    }
}

impl fmt::Debug for WhatsAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppConfig")
            .field("verify_token", &redact(&self.verify_token))
            .field("access_token", &redact(&self.access_token))
            .field("phone_number_id", &self.phone_number_id)
            .field("api_base", &self.api_base)
            .field("app_secret", &self.app_secret.as_deref().map(redact))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            model: default_ollama_model(),
        }
    }
}

/// Conversation routing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub input_mode: InputMode,
    /// Backend used for senders who never selected one.
    #[serde(default)]
    pub default_backend: Backend,
    /// Number of most recent turns passed to the backend as context.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
    /// Upper bound on a single backend call.
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,
}

fn default_context_turns() -> usize {
    4
}

fn default_backend_timeout_secs() -> u64 {
    120
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::default(),
            default_backend: Backend::default(),
            context_turns: default_context_turns(),
            backend_timeout_secs: default_backend_timeout_secs(),
        }
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "<unset>" } else { "<redacted>" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_default_values() {
        let config = RelayConfig::default();
        assert_eq!(config.server.port, 5500);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.routing.context_turns, 4);
        assert_eq!(config.routing.default_backend, Backend::Gemini);
        assert_eq!(config.routing.input_mode, InputMode::Buttons);
        assert_eq!(config.whatsapp.api_base, "https://graph.facebook.com/v18.0");
        assert!(config.whatsapp.app_secret.is_none());
    }

    #[test]
    fn test_relay_config_deserialize_empty() {
        let config: RelayConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 5500);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.routing.backend_timeout_secs, 120);
    }

    #[test]
    fn test_relay_config_deserialize_with_values() {
        let toml_str = r#"
[server]
port = 8080

[whatsapp]
verify_token = "verify-me"
phone_number_id = "1234"

[gemini]
model = "gemini-2.0-flash"

[routing]
input_mode = "text_commands"
default_backend = "ollama"
context_turns = 6
"#;
        let config: RelayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.whatsapp.verify_token, "verify-me");
        assert_eq!(config.whatsapp.phone_number_id, "1234");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.routing.input_mode, InputMode::TextCommands);
        assert_eq!(config.routing.default_backend, Backend::Ollama);
        assert_eq!(config.routing.context_turns, 6);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = RelayConfig::default();
        config.whatsapp.access_token = "EAAG-super-secret".to_string();
        config.gemini.api_key = "AIza-secret".to_string();

        let debug = format!("{config:?}");
        assert!(!debug.contains("EAAG-super-secret"));
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_input_mode_from_str() {
        assert_eq!("buttons".parse::<InputMode>().unwrap(), InputMode::Buttons);
        assert_eq!("TEXT".parse::<InputMode>().unwrap(), InputMode::TextCommands);
        assert!("menus".parse::<InputMode>().is_err());
    }
}
