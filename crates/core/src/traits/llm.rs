//! Response engine trait and chat message types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationHistory, TurnRole};
use crate::error::Result;

/// Message role understood by the response engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
        }
    }
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => Role::User,
            TurnRole::Responder => Role::Model,
        }
    }
}

/// Chat message sent to the response engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }

    /// Replay a conversation history as engine messages
    pub fn from_history(history: &ConversationHistory) -> Vec<Message> {
        history
            .turns()
            .iter()
            .map(|turn| Message {
                role: turn.role.into(),
                content: turn.text.clone(),
            })
            .collect()
    }
}

/// Response generation interface
///
/// `classify` is a lightweight call constrained to return exactly one
/// label from a closed set; `generate` produces response text from the
/// given message sequence.
#[async_trait]
pub trait ResponseEngine: Send + Sync {
    /// Classify an utterance into one intent label
    async fn classify(&self, text: &str) -> Result<String>;

    /// Generate response text for the given messages
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Turn;

    #[test]
    fn test_history_replay() {
        let mut history = ConversationHistory::new();
        history.push(Turn::user("hello"));
        history.push(Turn::responder("well met"));

        let messages = Message::from_history(&history);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Model);
        assert_eq!(messages[1].content, "well met");
    }
}
