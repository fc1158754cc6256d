//! Conversation routing core for chatrelay.
//!
//! This crate owns the decision logic: classifying inbound messages into
//! commands, mutating per-sender session state, routing content to a
//! generation backend and deciding what to send back. It defines the "ports"
//! (`SessionStore`, `GenerationBackend`, `Dispatcher`) that the infrastructure
//! layer implements, and depends only on `chatrelay-types` -- never on
//! `chatrelay-infra` or any HTTP crate.

pub mod backend;
pub mod classifier;
pub mod dispatch;
pub mod menu;
pub mod router;
pub mod service;
pub mod session;
