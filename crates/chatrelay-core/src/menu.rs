//! Interactive menus and fixed acknowledgement texts.

use chatrelay_types::message::{
    BUTTON_MODEL_GEMINI, BUTTON_MODEL_OLLAMA, BUTTON_RESET_MEMORY, ButtonMenu, MenuButton,
};
use chatrelay_types::session::Backend;

pub const INVALID_MODEL_TEXT: &str = "❌ Invalid model. Use /model gemini or /model ollama.";

pub const MEMORY_CLEARED_TEXT: &str = "🧠 Memory cleared.";

pub const MEMORY_RESET_SELECT_TEXT: &str = "🧠 Memory reset. Please select a model again.";

/// Acknowledgement after a successful model switch.
pub fn model_selected_text(backend: Backend) -> String {
    format!("✅ Model set to {}. Ask your question.", backend.display_name())
}

/// First-contact menu: pick a backend.
pub fn model_selection_menu() -> ButtonMenu {
    ButtonMenu {
        body: "👋 Hello! Choose a model to begin:".to_string(),
        buttons: vec![
            MenuButton::new(BUTTON_MODEL_GEMINI, Backend::Gemini.display_name()),
            MenuButton::new(BUTTON_MODEL_OLLAMA, Backend::Ollama.display_name()),
        ],
    }
}

/// Menu offered after each reply: switch backend or clear memory.
pub fn post_response_menu() -> ButtonMenu {
    ButtonMenu {
        body: "🔁 Would you like to switch models or reset memory?".to_string(),
        buttons: vec![
            MenuButton::new(BUTTON_MODEL_GEMINI, Backend::Gemini.display_name()),
            MenuButton::new(BUTTON_MODEL_OLLAMA, Backend::Ollama.display_name()),
            MenuButton::new(BUTTON_RESET_MEMORY, "🧠 Reset"),
        ],
    }
}
