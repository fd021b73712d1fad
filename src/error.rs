//! Crate-level error taxonomy (spec §7).
//!
//! One `RelayError` enum covers every failure the relay surfaces, with a
//! `Result<T>` alias used throughout the crate. Local client error enums
//! (`LlmError`, `GatewayError`) are converted into `RelayError` at the call
//! sites that bridge them.

use thiserror::Error;

/// Convenience alias for results carrying a [`RelayError`].
pub type Result<T> = std::result::Result<T, RelayError>;

/// The crate-level error taxonomy.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request was malformed (empty identity/message, bad payload).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The identity is not permitted by the country allow-list.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The inbound message cannot fit the token budget even on its own.
    #[error("message exceeds token budget")]
    Oversized,

    /// An upstream dependency (LLM or SMS gateway) failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// A persistence-layer operation failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The service is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
}
