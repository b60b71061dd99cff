//! Synthesis egress pump
//!
//! Drives one streaming synthesis and forwards its chunks, in the
//! order received, into the session's outbound frame channel. Each
//! call is one turn; the strictly serial turn loop is what keeps two
//! turns' audio from interleaving.

use tokio::sync::mpsc;

use stellar_core::{Error, Result, SynthesisEngine};

use crate::outbound::OutboundFrame;

/// Synthesize `text` and stream its audio to the client.
pub async fn speak(
    engine: &dyn SynthesisEngine,
    text: &str,
    frames: &mpsc::Sender<OutboundFrame>,
) -> Result<()> {
    let mut audio = engine.synthesize(text).await?;

    let mut chunks = 0usize;
    while let Some(chunk) = audio.recv().await {
        frames
            .send(OutboundFrame::Audio(chunk.data))
            .await
            .map_err(|_| Error::Synthesis("connection closed mid-turn".to_string()))?;
        chunks += 1;
    }

    tracing::debug!(chunks, "turn audio delivered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stellar_core::AudioChunk;

    struct ChunkedVoice {
        chunks: Vec<Vec<u8>>,
    }

    #[async_trait]
    impl SynthesisEngine for ChunkedVoice {
        async fn synthesize(&self, _text: &str) -> Result<mpsc::Receiver<AudioChunk>> {
            let (tx, rx) = mpsc::channel(8);
            for data in self.chunks.clone() {
                tx.send(AudioChunk::outbound(data))
                    .await
                    .map_err(|_| Error::Synthesis("receiver dropped".to_string()))?;
            }
            Ok(rx)
        }
    }

    struct BrokenVoice;

    #[async_trait]
    impl SynthesisEngine for BrokenVoice {
        async fn synthesize(&self, _text: &str) -> Result<mpsc::Receiver<AudioChunk>> {
            Err(Error::Synthesis("voice unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_chunks_forwarded_in_order() {
        let engine = ChunkedVoice {
            chunks: vec![vec![1], vec![2], vec![3]],
        };
        let (tx, mut rx) = mpsc::channel(8);

        speak(&engine, "hello", &tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(OutboundFrame::Audio(vec![1])));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Audio(vec![2])));
        assert_eq!(rx.recv().await, Some(OutboundFrame::Audio(vec![3])));
    }

    #[tokio::test]
    async fn test_synthesis_failure_propagates() {
        let (tx, _rx) = mpsc::channel(8);
        let err = speak(&BrokenVoice, "hello", &tx).await.unwrap_err();
        assert!(matches!(err, Error::Synthesis(_)));
    }
}
