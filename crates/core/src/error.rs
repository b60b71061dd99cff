//! Error types shared by the engine interfaces

use thiserror::Error;

/// Result alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the external engine interfaces
///
/// Each variant maps to one stage of the turn pipeline so the session
/// coordinator can decide whether a failure is turn-local (degrade and
/// keep the session alive) or connection-local (tear the session down).
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Transcription stream could not be opened or fed. Fatal to the
    /// session: once audio can no longer reach the transcriber the
    /// connection is useless.
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Intent classification failed. Recovered locally by the router
    /// (defaults to general chat), never fails a turn.
    #[error("classification error: {0}")]
    Classification(String),

    /// Response generation failed for one turn. Turn-local: the
    /// coordinator apologises and waits for the next utterance.
    #[error("generation error: {0}")]
    Generation(String),

    /// Response text exists but could not be spoken. Turn-local.
    #[error("synthesis error: {0}")]
    Synthesis(String),
}

impl Error {
    /// Whether this failure ends the session (vs. only the current turn)
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Transcription(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality() {
        assert!(Error::Transcription("stream closed".into()).is_fatal());
        assert!(!Error::Generation("model overloaded".into()).is_fatal());
        assert!(!Error::Synthesis("voice unavailable".into()).is_fatal());
    }
}
