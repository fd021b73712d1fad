//! Chat completion upstream

pub mod client;

pub use client::{ChatClient, ChatClientConfig, LlmError};
