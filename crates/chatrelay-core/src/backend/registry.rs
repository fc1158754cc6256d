//! Backend registry: one client per selectable [`Backend`].

use std::collections::HashMap;

use chatrelay_types::error::BackendError;
use chatrelay_types::session::Backend;

use super::box_backend::BoxBackend;
use super::provider::GenerationBackend;

/// Maps each backend selection to the client that serves it.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: HashMap<Backend, BoxBackend>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for `backend`, replacing any previous client.
    pub fn register<T: GenerationBackend + 'static>(&mut self, backend: Backend, client: T) {
        self.backends.insert(backend, BoxBackend::new(client));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<T: GenerationBackend + 'static>(mut self, backend: Backend, client: T) -> Self {
        self.register(backend, client);
        self
    }

    /// Look up the client for `backend`.
    pub fn get(&self, backend: Backend) -> Result<&BoxBackend, BackendError> {
        self.backends
            .get(&backend)
            .ok_or_else(|| BackendError::NotConfigured(backend.to_string()))
    }

    /// Registered selections, in `Backend::ALL` order.
    pub fn available(&self) -> Vec<Backend> {
        Backend::ALL
            .into_iter()
            .filter(|b| self.backends.contains_key(b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl GenerationBackend for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn generate(&self, _prompt: &str, _context: &str) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_registry_lookup() {
        let registry = BackendRegistry::new().with(Backend::Ollama, Fixed("ollama"));
        assert_eq!(registry.get(Backend::Ollama).unwrap().name(), "ollama");
        assert!(matches!(
            registry.get(Backend::Gemini),
            Err(BackendError::NotConfigured(name)) if name == "gemini"
        ));
    }

    #[test]
    fn test_registry_available_order() {
        let registry = BackendRegistry::new()
            .with(Backend::Ollama, Fixed("ollama"))
            .with(Backend::Gemini, Fixed("gemini"));
        assert_eq!(registry.available(), vec![Backend::Gemini, Backend::Ollama]);
    }
}
