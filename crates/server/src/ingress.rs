//! Audio ingress pump
//!
//! Drains the buffered inbound audio channel into the transcription
//! sink. Runs independently of turn processing: the socket read loop
//! only enqueues, so audio keeps flowing while a response is being
//! generated and spoken. A forward failure is fatal to the session:
//! once audio can no longer reach the transcriber the connection is
//! useless.

use tokio::sync::mpsc;

use stellar_core::{AudioChunk, TranscriptionSink};

use crate::metrics::record_error;
use crate::ServerError;

/// Pump audio chunks into the transcription sink until the channel
/// closes (clean disconnect) or a forward fails.
pub async fn pump(
    mut audio: mpsc::Receiver<AudioChunk>,
    mut sink: Box<dyn TranscriptionSink>,
) -> Result<(), ServerError> {
    while let Some(chunk) = audio.recv().await {
        if let Err(e) = sink.feed(chunk).await {
            record_error("ingress");
            tracing::error!("audio forward failed: {}", e);
            return Err(ServerError::Ingress(e.to_string()));
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!("transcription sink close reported: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stellar_core::{Error, Result as CoreResult};

    struct CountingSink {
        fed: usize,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl TranscriptionSink for CountingSink {
        async fn feed(&mut self, _chunk: AudioChunk) -> CoreResult<()> {
            self.fed += 1;
            match self.fail_after {
                Some(n) if self.fed > n => {
                    Err(Error::Transcription("stream closed".to_string()))
                }
                _ => Ok(()),
            }
        }

        async fn close(self: Box<Self>) -> CoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_pump_drains_until_channel_closes() {
        let (tx, rx) = mpsc::channel(8);
        for _ in 0..3 {
            tx.send(AudioChunk::inbound(vec![0u8; 320])).await.unwrap();
        }
        drop(tx);

        let sink = Box::new(CountingSink {
            fed: 0,
            fail_after: None,
        });
        assert!(pump(rx, sink).await.is_ok());
    }

    #[tokio::test]
    async fn test_forward_failure_is_fatal() {
        let (tx, rx) = mpsc::channel(8);
        for _ in 0..3 {
            tx.send(AudioChunk::inbound(vec![0u8; 320])).await.unwrap();
        }
        drop(tx);

        let sink = Box::new(CountingSink {
            fed: 0,
            fail_after: Some(1),
        });
        let err = pump(rx, sink).await.unwrap_err();
        assert!(matches!(err, ServerError::Ingress(_)));
    }
}
