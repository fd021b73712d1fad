//! Conversation assembly from persisted history

use crate::context::models::{Conversation, Turn};
use crate::error::{RelayError, Result};

/// Builds the ordered message list for one request.
///
/// Output shape: `[system prompt]` + one (user, assistant) pair per persisted
/// turn, oldest first, + `[user: new message]`. No side effects.
pub struct ConversationAssembler {
    system_prompt: String,
}

impl ConversationAssembler {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Assemble the conversation for an inbound message.
    ///
    /// Fails only on an empty identity or message; the store is never
    /// touched here.
    pub fn assemble(&self, identity: &str, message: &str, turns: &[Turn]) -> Result<Conversation> {
        if identity.is_empty() {
            return Err(RelayError::InvalidInput("identity is empty".to_string()));
        }
        if message.is_empty() {
            return Err(RelayError::InvalidInput("message is empty".to_string()));
        }

        let mut conversation = Conversation::with_system_prompt(&self.system_prompt);
        for turn in turns {
            conversation.push_turn(turn);
        }
        conversation.push_user(message);
        Ok(conversation)
    }
}
