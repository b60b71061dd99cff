//! Speech engine traits

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::audio::AudioChunk;
use crate::error::Result;
use crate::transcript::TranscriptEvent;

/// Streaming speech-to-text interface
///
/// `open` establishes one streaming transcription session and returns a
/// sink for audio plus the receiver on which the engine delivers
/// partial and final transcript events.
///
/// Event delivery originates on an engine-owned task; the receiver is
/// the only hand-off into session code, so the engine never touches
/// session state directly.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Open a transcription stream for mono audio at `sample_rate` Hz
    async fn open(
        &self,
        sample_rate: u32,
    ) -> Result<(Box<dyn TranscriptionSink>, mpsc::Receiver<TranscriptEvent>)>;
}

/// The audio intake half of an open transcription stream
#[async_trait]
pub trait TranscriptionSink: Send {
    /// Forward one inbound audio chunk to the engine
    async fn feed(&mut self, chunk: AudioChunk) -> Result<()>;

    /// Close the stream and release engine-side resources
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Streaming text-to-speech interface
///
/// Each call is an independent, finite, non-restartable synthesis: the
/// returned receiver yields the audio chunks for `text` in delivery
/// order and then closes.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Synthesize `text`, streaming audio chunks as they are produced
    async fn synthesize(&self, text: &str) -> Result<mpsc::Receiver<AudioChunk>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    // Mock engine that emits a scripted sequence of events, used to
    // sanity-check the trait shapes compile and compose.
    struct ScriptedEngine {
        events: Vec<TranscriptEvent>,
    }

    struct NullSink;

    #[async_trait]
    impl TranscriptionSink for NullSink {
        async fn feed(&mut self, _chunk: AudioChunk) -> Result<()> {
            Ok(())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl TranscriptionEngine for ScriptedEngine {
        async fn open(
            &self,
            _sample_rate: u32,
        ) -> Result<(Box<dyn TranscriptionSink>, mpsc::Receiver<TranscriptEvent>)> {
            let (tx, rx) = mpsc::channel(16);
            for event in self.events.clone() {
                tx.send(event).await.map_err(|_| {
                    Error::Transcription("event receiver dropped".into())
                })?;
            }
            Ok((Box::new(NullSink), rx))
        }
    }

    #[tokio::test]
    async fn test_scripted_engine_delivers_events() {
        let engine = ScriptedEngine {
            events: vec![
                TranscriptEvent::partial("tell"),
                TranscriptEvent::finalized("tell me a story"),
            ],
        };

        let (mut sink, mut rx) = engine.open(16_000).await.unwrap();
        sink.feed(AudioChunk::inbound(vec![0u8; 320])).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), TranscriptEvent::partial("tell"));
        assert_eq!(
            rx.recv().await.unwrap(),
            TranscriptEvent::finalized("tell me a story")
        );
    }
}
