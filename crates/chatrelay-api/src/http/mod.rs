//! HTTP layer: the WhatsApp webhook endpoint and a health probe.

pub mod handlers;
pub mod router;
