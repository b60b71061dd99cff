//! Conversation history types
//!
//! The history is an ordered sequence of turns replayed verbatim to the
//! response engine as context. Insertion order is significant. Only the
//! response router mutates it, and only after a successful response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of the speaker in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// The human on the microphone
    User,
    /// The automated responder
    Responder,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Responder => "responder",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text)
    }

    pub fn responder(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Responder, text)
    }
}

/// Ordered conversation history for one session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Whether the history already starts with the given persona preamble
    /// (a user turn carrying the preamble followed by the responder's
    /// acknowledgement).
    pub fn has_preamble(&self, preamble: &str) -> bool {
        match self.turns.first() {
            Some(first) => first.role == TurnRole::User && first.text == preamble,
            None => false,
        }
    }

    /// Insert the persona turn pair at the start of the history, once.
    ///
    /// Idempotent: calling this on a history that already begins with the
    /// preamble pair is a no-op, so the persona is never duplicated as
    /// the conversation grows.
    pub fn ensure_preamble(&mut self, preamble: &str, acknowledgement: &str) {
        if self.has_preamble(preamble) {
            return;
        }
        self.turns.insert(0, Turn::responder(acknowledgement));
        self.turns.insert(0, Turn::user(preamble));
    }
}

/// Output of exactly one response strategy for one utterance
#[derive(Debug, Clone)]
pub struct ResponseResult {
    /// Response text, ready for synthesis
    pub text: String,
    /// History to carry into the next turn. Strategies that are
    /// self-contained (stories, fact lookups) return the input history
    /// unchanged.
    pub history: ConversationHistory,
}
