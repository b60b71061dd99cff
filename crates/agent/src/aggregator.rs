//! Transcript aggregator
//!
//! Pure state machine over transcription events. Partial events
//! overwrite the in-progress text; a non-empty final event closes the
//! turn and resets the state. Turn boundaries come solely from the
//! upstream `is_final` flag.

use stellar_core::{TranscriptEvent, Utterance};

/// What the aggregator produced for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnUpdate {
    /// Live caption text; non-authoritative, overwrites the previous one
    Partial(String),
    /// The turn is complete; exactly one of these per turn
    Finalized(Utterance),
}

/// Aggregates transcript events into turns
#[derive(Debug, Default)]
pub struct TranscriptAggregator {
    current: String,
}

impl TranscriptAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the turn in progress
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Apply one event, returning what (if anything) to surface
    pub fn on_event(&mut self, event: TranscriptEvent) -> Option<TurnUpdate> {
        if !event.is_final {
            self.current = event.text.clone();
            return Some(TurnUpdate::Partial(event.text));
        }

        // Empty final: no utterance, no turn.
        if event.text.is_empty() {
            return None;
        }

        self.current.clear();
        Some(TurnUpdate::Finalized(Utterance::new(event.text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_overwrites() {
        let mut agg = TranscriptAggregator::new();

        let update = agg.on_event(TranscriptEvent::partial("tell"));
        assert_eq!(update, Some(TurnUpdate::Partial("tell".to_string())));

        let update = agg.on_event(TranscriptEvent::partial("tell me a"));
        assert_eq!(update, Some(TurnUpdate::Partial("tell me a".to_string())));
        assert_eq!(agg.current(), "tell me a");
    }

    #[test]
    fn test_exactly_one_finalization_per_turn() {
        let mut agg = TranscriptAggregator::new();
        agg.on_event(TranscriptEvent::partial("tell me a"));

        let update = agg.on_event(TranscriptEvent::finalized("tell me a story"));
        assert_eq!(
            update,
            Some(TurnUpdate::Finalized(Utterance::new("tell me a story")))
        );

        // State is reset for the next turn.
        assert_eq!(agg.current(), "");
        let update = agg.on_event(TranscriptEvent::partial("where"));
        assert_eq!(update, Some(TurnUpdate::Partial("where".to_string())));
    }

    #[test]
    fn test_empty_final_is_noop() {
        let mut agg = TranscriptAggregator::new();
        agg.on_event(TranscriptEvent::partial("hm"));

        assert_eq!(agg.on_event(TranscriptEvent::finalized("")), None);
    }
}
