//! SMS to LLM relay service
//!
//! Relays inbound SMS messages to a chat-completion API and returns the
//! model's reply through the SMS gateway, keeping a bounded per-number
//! conversation history under a fixed token budget.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod history;
pub mod llm;
pub mod metrics;
pub mod relay;

pub use config::Config;
pub use error::{RelayError, Result};
