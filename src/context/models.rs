//! Conversation data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message role in a chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role/content entry, rebuilt per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// One persisted (inbound message, outbound reply) pair for an identity.
/// Immutable once written; deleted in bulk on a reset command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub identity: String,
    pub user_message: String,
    pub assistant_response: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered message sequence sent to the LLM.
///
/// Index 0 is the system prompt; user/assistant messages after it alternate
/// in (user, assistant) pairs, followed by the trailing new user message.
/// The empty conversation is the sentinel for "cannot fit even the new
/// message".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    /// Start a conversation with the system prompt at index 0
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ConversationMessage::new(Role::System, prompt)],
        }
    }

    /// The unsatisfiable sentinel
    pub fn unsatisfiable() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a persisted turn as its (user, assistant) pair
    pub fn push_turn(&mut self, turn: &Turn) {
        self.messages
            .push(ConversationMessage::new(Role::User, &turn.user_message));
        self.messages.push(ConversationMessage::new(
            Role::Assistant,
            &turn.assistant_response,
        ));
    }

    /// Append the new inbound message as the trailing user entry
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages
            .push(ConversationMessage::new(Role::User, content));
    }

    /// Remove the oldest user/assistant pair (positions 1 and 2).
    ///
    /// No-op below 3 messages; the trimmer checks the length first so the
    /// system prompt and the trailing user message survive every eviction.
    pub fn remove_oldest_pair(&mut self) {
        if self.messages.len() > 2 {
            self.messages.drain(1..3);
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn first(&self) -> Option<&ConversationMessage> {
        self.messages.first()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(user: &str, assistant: &str) -> Turn {
        Turn {
            id: 1,
            identity: "+15551234".to_string(),
            user_message: user.to_string(),
            assistant_response: assistant.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_system_prompt_is_first() {
        let conversation = Conversation::with_system_prompt("Be brief.");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.first().unwrap().role, Role::System);
        assert_eq!(conversation.first().unwrap().content, "Be brief.");
    }

    #[test]
    fn test_push_turn_keeps_pair_order() {
        let mut conversation = Conversation::with_system_prompt("Be brief.");
        conversation.push_turn(&turn("hi", "hello"));
        conversation.push_user("how are you?");

        let roles: Vec<Role> = conversation.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(conversation.last().unwrap().content, "how are you?");
    }

    #[test]
    fn test_remove_oldest_pair_targets_positions_one_and_two() {
        let mut conversation = Conversation::with_system_prompt("Be brief.");
        conversation.push_turn(&turn("first", "first reply"));
        conversation.push_turn(&turn("second", "second reply"));
        conversation.push_user("third");

        conversation.remove_oldest_pair();

        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.messages()[1].content, "second");
        assert_eq!(conversation.last().unwrap().content, "third");
    }

    #[test]
    fn test_remove_oldest_pair_is_noop_on_minimal_conversation() {
        let mut conversation = Conversation::with_system_prompt("Be brief.");
        conversation.push_user("hello");
        conversation.remove_oldest_pair();
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let message = ConversationMessage::new(Role::Assistant, "ok");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
    }
}
