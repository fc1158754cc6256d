//! GenerationBackend trait definition.
//!
//! This is the contract every text-generation service implements: one prompt
//! plus a transcript of recent turns in, one reply string out.

use chatrelay_types::error::BackendError;

/// Trait for text-generation backends (Gemini, Ollama).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Implementations
/// live in chatrelay-infra.
pub trait GenerationBackend: Send + Sync {
    /// Short backend name for logs (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate a reply to `prompt`, given `context` as a newline-joined
    /// `"<Role>: <content>"` transcript (possibly empty).
    fn generate(
        &self,
        prompt: &str,
        context: &str,
    ) -> impl std::future::Future<Output = Result<String, BackendError>> + Send;
}
