//! Text-generation backend abstractions.
//!
//! - `GenerationBackend`: RPITIT trait for concrete backend clients
//! - `BoxBackend`: object-safe wrapper for dynamic dispatch
//! - `BackendRegistry`: maps a [`Backend`](chatrelay_types::session::Backend) selection to its client

pub mod box_backend;
pub mod provider;
pub mod registry;

pub use box_backend::BoxBackend;
pub use provider::GenerationBackend;
pub use registry::BackendRegistry;
