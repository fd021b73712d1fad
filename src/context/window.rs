//! Conversation window trimming under a fixed token budget

use crate::context::models::Conversation;
use crate::context::token_estimator::TokenEstimator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default token budget for an outbound LLM request
pub const DEFAULT_TOKEN_BUDGET: usize = 4000;

/// Result of one trim pass
#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub conversation: Conversation,
    pub evicted_pairs: usize,
}

impl TrimOutcome {
    /// True when even `[system, new message]` exceeds the budget
    pub fn is_unsatisfiable(&self) -> bool {
        self.conversation.is_empty()
    }
}

/// Evicts the oldest history pairs until the conversation fits the budget.
///
/// Pure FIFO: removal always targets the pair immediately following the
/// system prompt. The system prompt and the trailing user message are never
/// removed; when no removable pair is left and the estimate still exceeds
/// the budget, the empty sentinel is returned.
pub struct WindowTrimmer {
    estimator: Arc<dyn TokenEstimator>,
    budget: usize,
}

impl WindowTrimmer {
    pub fn new(estimator: Arc<dyn TokenEstimator>, budget: usize) -> Self {
        Self { estimator, budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Trim the conversation to fit the budget, or return the sentinel.
    pub fn trim(&self, mut conversation: Conversation) -> TrimOutcome {
        let mut evicted_pairs = 0;

        while self.estimator.estimate_conversation(&conversation) > self.budget {
            if conversation.len() <= 2 {
                warn!(
                    budget = self.budget,
                    evicted_pairs, "conversation cannot fit even the new message"
                );
                return TrimOutcome {
                    conversation: Conversation::unsatisfiable(),
                    evicted_pairs,
                };
            }
            conversation.remove_oldest_pair();
            evicted_pairs += 1;
        }

        if evicted_pairs > 0 {
            debug!(
                evicted_pairs,
                budget = self.budget,
                remaining = conversation.len(),
                "evicted oldest pairs to fit budget"
            );
        }

        TrimOutcome {
            conversation,
            evicted_pairs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::models::{Role, Turn};
    use chrono::Utc;

    /// One token per byte of the serialized conversation; deterministic and
    /// strictly monotone in message length.
    struct ByteLenEstimator;

    impl TokenEstimator for ByteLenEstimator {
        fn estimate(&self, text: &str) -> usize {
            text.len()
        }
    }

    fn trimmer(budget: usize) -> WindowTrimmer {
        WindowTrimmer::new(Arc::new(ByteLenEstimator), budget)
    }

    fn conversation_with_turns(count: usize, new_message: &str) -> Conversation {
        let mut conversation = Conversation::with_system_prompt("Be brief.");
        for i in 0..count {
            conversation.push_turn(&Turn {
                id: i as i64,
                identity: "+15551234".to_string(),
                user_message: format!("question number {i:02} with some padding text"),
                assistant_response: format!("answer number {i:02} with some padding text"),
                created_at: Utc::now(),
            });
        }
        conversation.push_user(new_message);
        conversation
    }

    #[test]
    fn test_within_budget_returns_unchanged() {
        let conversation = conversation_with_turns(2, "hello");
        let outcome = trimmer(100_000).trim(conversation.clone());

        assert_eq!(outcome.conversation, conversation);
        assert_eq!(outcome.evicted_pairs, 0);
    }

    #[test]
    fn test_trimming_is_idempotent() {
        let conversation = conversation_with_turns(20, "hello");
        let trimmer = trimmer(800);

        let once = trimmer.trim(conversation);
        assert!(once.evicted_pairs > 0);

        let twice = trimmer.trim(once.conversation.clone());
        assert_eq!(twice.conversation, once.conversation);
        assert_eq!(twice.evicted_pairs, 0);
    }

    #[test]
    fn test_system_prompt_and_new_message_survive() {
        let conversation = conversation_with_turns(20, "the new message");
        let outcome = trimmer(800).trim(conversation);

        assert!(!outcome.is_unsatisfiable());
        let first = outcome.conversation.first().unwrap();
        let last = outcome.conversation.last().unwrap();
        assert_eq!(first.role, Role::System);
        assert_eq!(first.content, "Be brief.");
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "the new message");
    }

    #[test]
    fn test_eviction_is_fifo() {
        let conversation = conversation_with_turns(50, "newest");
        let outcome = trimmer(2000).trim(conversation);

        assert!(outcome.evicted_pairs > 0);
        assert!(outcome.evicted_pairs < 50);

        // The survivors are exactly the most recent pairs, still in order.
        let first_kept = &outcome.conversation.messages()[1];
        let expected_first = format!(
            "question number {:02} with some padding text",
            outcome.evicted_pairs
        );
        assert_eq!(first_kept.content, expected_first);
    }

    #[test]
    fn test_minimal_conversation_over_budget_is_unsatisfiable() {
        let mut conversation = Conversation::with_system_prompt("Be brief.");
        conversation.push_user("a message that will never fit");

        let outcome = trimmer(10).trim(conversation);
        assert!(outcome.is_unsatisfiable());
        assert!(outcome.conversation.is_empty());
    }

    #[test]
    fn test_long_history_over_tiny_budget_is_unsatisfiable() {
        let conversation = conversation_with_turns(10, "hello");
        let outcome = trimmer(10).trim(conversation);

        assert!(outcome.is_unsatisfiable());
        assert_eq!(outcome.evicted_pairs, 10);
    }

    #[test]
    fn test_sentinel_trims_to_sentinel() {
        let outcome = trimmer(10_000).trim(Conversation::unsatisfiable());
        // "[]" fits any sane budget; the sentinel stays empty either way.
        assert!(outcome.conversation.is_empty());
    }
}
