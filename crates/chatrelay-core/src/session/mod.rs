//! Per-sender session state.
//!
//! - `SessionStore`: async port trait for history and backend selection
//! - `InMemorySessionStore`: process-resident implementation backed by `DashMap`

pub mod memory;
pub mod store;

pub use memory::InMemorySessionStore;
pub use store::SessionStore;
