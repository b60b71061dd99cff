//! Transcript event and utterance types

use serde::{Deserialize, Serialize};

/// One event from the transcription engine
///
/// Partial events carry the current best guess for the in-progress
/// utterance and overwrite any previous partial. A final event closes
/// the turn. Turn boundaries are decided solely by the upstream
/// `is_final` flag; nothing here infers silence timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Current transcript text for the in-progress turn
    pub text: String,
    /// Whether the transcription engine considers the turn complete
    pub is_final: bool,
}

impl TranscriptEvent {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// The finalized text of one turn
///
/// Immutable once created; handed from the aggregator to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for Utterance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors() {
        let ev = TranscriptEvent::partial("tell me");
        assert!(!ev.is_final);

        let ev = TranscriptEvent::finalized("tell me a story");
        assert!(ev.is_final);
        assert_eq!(ev.text, "tell me a story");
    }
}
