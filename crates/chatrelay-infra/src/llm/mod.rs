//! Generation backend clients.
//!
//! - `GeminiBackend`: Google Generative Language API (`generateContent`)
//! - `OllamaBackend`: local Ollama server (`/api/generate`)
//! - `build_backends`: registry construction from [`RelayConfig`]

pub mod gemini;
pub mod ollama;

use std::time::Duration;

use secrecy::SecretString;

use chatrelay_core::backend::BackendRegistry;
use chatrelay_types::config::RelayConfig;
use chatrelay_types::error::BackendError;
use chatrelay_types::session::Backend;

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

/// Build a reqwest client with an overall request timeout.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Request(format!("failed to build HTTP client: {e}")))
}

/// Merge the conversation transcript and the latest question into one prompt.
///
/// The transcript already ends with the question as a `User:` line, so the
/// question is repeated only when there is no transcript at all.
pub fn combine_prompt(prompt: &str, context: &str) -> String {
    if context.trim().is_empty() {
        return prompt.to_string();
    }
    format!(
        "Conversation so far:\n{context}\n\nReply to the user's latest message: {prompt}"
    )
}

/// Register both backends from configuration.
///
/// Gemini is always registered; a missing API key surfaces as an HTTP 4xx on
/// first use and is warned about here.
pub fn build_backends(config: &RelayConfig) -> Result<BackendRegistry, BackendError> {
    let client = http_client(Duration::from_secs(config.routing.backend_timeout_secs))?;

    if config.gemini.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; Gemini requests will fail");
    }

    let gemini = GeminiBackend::new(
        client.clone(),
        SecretString::from(config.gemini.api_key.clone()),
        config.gemini.model.clone(),
    )
    .with_base_url(config.gemini.base_url.clone());

    let ollama = OllamaBackend::new(
        client,
        config.ollama.base_url.clone(),
        config.ollama.model.clone(),
    );

    tracing::info!(
        gemini_model = %config.gemini.model,
        ollama_model = %config.ollama.model,
        ollama_url = %config.ollama.base_url,
        "generation backends registered"
    );

    Ok(BackendRegistry::new()
        .with(Backend::Gemini, gemini)
        .with(Backend::Ollama, ollama))
}
