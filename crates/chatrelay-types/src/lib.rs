//! Shared domain types for chatrelay.
//!
//! This crate contains the types passed between the routing core, the
//! infrastructure adapters and the HTTP layer: senders, turns, backend
//! selection, the WhatsApp webhook and send payloads, configuration and the
//! error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod message;
pub mod session;
pub mod whatsapp;
