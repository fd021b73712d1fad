//! Token estimation using tiktoken

use crate::context::models::Conversation;
use crate::error::RelayError;
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Token estimator trait for different tokenization strategies
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in the given text
    fn estimate(&self, text: &str) -> usize;

    /// Estimate the cost of a serialized conversation.
    ///
    /// A conversation that cannot be serialized counts as infinite, so the
    /// trimmer evicts pairs instead of the request crashing.
    fn estimate_conversation(&self, conversation: &Conversation) -> usize {
        match serde_json::to_string(conversation.messages()) {
            Ok(serialized) => self.estimate(&serialized),
            Err(_) => usize::MAX,
        }
    }
}

/// Tiktoken-based token estimator using cl100k_base
pub struct TiktokenEstimator {
    bpe: Arc<CoreBPE>,
}

impl TiktokenEstimator {
    /// Create a new tiktoken estimator with cl100k_base encoding
    pub fn new() -> Result<Self, RelayError> {
        let bpe = cl100k_base()
            .map_err(|e| RelayError::Configuration(format!("failed to load cl100k_base: {e}")))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }
}

impl TokenEstimator for TiktokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Word-based token estimator (fallback, ~1.3 tokens per word)
pub struct WordBasedEstimator {
    tokens_per_word: f64,
}

impl WordBasedEstimator {
    pub fn new(tokens_per_word: f64) -> Self {
        Self { tokens_per_word }
    }
}

impl Default for WordBasedEstimator {
    fn default() -> Self {
        Self::new(1.3)
    }
}

impl TokenEstimator for WordBasedEstimator {
    fn estimate(&self, text: &str) -> usize {
        let word_count = text.split_whitespace().count();
        (word_count as f64 * self.tokens_per_word).ceil() as usize
    }
}
