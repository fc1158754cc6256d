//! HTTP request handlers.

pub mod health;
pub mod verify;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support {
    use chatrelay_types::config::RelayConfig;

    use crate::state::AppState;

    pub const VERIFY_TOKEN: &str = "verify-me";
    pub const APP_SECRET: &str = "app-secret";

    /// State with a verify token, optionally requiring signatures.
    pub fn state(with_secret: bool) -> AppState {
        let mut config = RelayConfig::default();
        config.whatsapp.verify_token = VERIFY_TOKEN.to_string();
        config.whatsapp.api_base = "http://127.0.0.1:9".to_string();
        config.ollama.base_url = "http://127.0.0.1:9".to_string();
        if with_secret {
            config.whatsapp.app_secret = Some(APP_SECRET.to_string());
        }
        AppState::init(&config).unwrap()
    }
}
