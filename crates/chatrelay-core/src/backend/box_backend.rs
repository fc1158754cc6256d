//! BoxBackend -- object-safe dynamic dispatch wrapper for GenerationBackend.
//!
//! 1. Define an object-safe `GenerationBackendDyn` trait with boxed futures
//! 2. Blanket-impl `GenerationBackendDyn` for all `T: GenerationBackend`
//! 3. `BoxBackend` wraps `Box<dyn GenerationBackendDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use chatrelay_types::error::BackendError;

use super::provider::GenerationBackend;

/// Object-safe version of [`GenerationBackend`] with boxed futures.
pub trait GenerationBackendDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
        context: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>>;
}

impl<T: GenerationBackend> GenerationBackendDyn for T {
    fn name(&self) -> &str {
        GenerationBackend::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
        context: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>> {
        Box::pin(self.generate(prompt, context))
    }
}

/// Type-erased backend for runtime selection.
///
/// Since `GenerationBackend` uses RPITIT it cannot be a trait object
/// directly; `BoxBackend` provides the same methods over a boxed
/// `GenerationBackendDyn`.
pub struct BoxBackend {
    inner: Box<dyn GenerationBackendDyn + Send + Sync>,
}

impl BoxBackend {
    /// Wrap a concrete backend.
    pub fn new<T: GenerationBackend + 'static>(backend: T) -> Self {
        Self {
            inner: Box::new(backend),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn generate(&self, prompt: &str, context: &str) -> Result<String, BackendError> {
        self.inner.generate_boxed(prompt, context).await
    }
}

impl std::fmt::Debug for BoxBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxBackend").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl GenerationBackend for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str, context: &str) -> Result<String, BackendError> {
            Ok(format!("{context}|{prompt}"))
        }
    }

    #[tokio::test]
    async fn test_box_backend_delegates() {
        let backend = BoxBackend::new(Echo);
        assert_eq!(backend.name(), "echo");
        assert_eq!(backend.generate("q", "ctx").await.unwrap(), "ctx|q");
    }
}
