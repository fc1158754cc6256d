//! Infrastructure layer for chatrelay.
//!
//! Concrete implementations of the ports defined in `chatrelay-core`:
//! HTTP clients for the Gemini and Ollama generation backends, the WhatsApp
//! Cloud API dispatcher, webhook signature verification and the TOML/env
//! configuration loader.

pub mod config;
pub mod llm;
pub mod signature;
pub mod whatsapp;
