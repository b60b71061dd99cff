//! Streaming transcription client
//!
//! Full-duplex chunked HTTP: the request body is the live audio stream
//! and the response body is newline-delimited JSON turn events. The
//! upload half is fed through a channel-backed body; the download half
//! is parsed on a dedicated task that emits `TranscriptEvent`s.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{Body, Client};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use stellar_config::TranscriptionConfig;
use stellar_core::{
    AudioChunk, Error, Result, TranscriptEvent, TranscriptionEngine, TranscriptionSink,
};

/// Streaming speech-to-text client
pub struct StreamingTranscriber {
    client: Client,
    config: TranscriptionConfig,
    api_key: String,
}

impl StreamingTranscriber {
    pub fn new(config: TranscriptionConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(
                config.connect_timeout_seconds,
            ))
            .build()
            .map_err(|e| Error::Transcription(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TranscriptionEngine for StreamingTranscriber {
    async fn open(
        &self,
        sample_rate: u32,
    ) -> Result<(Box<dyn TranscriptionSink>, mpsc::Receiver<TranscriptEvent>)> {
        let (audio_tx, audio_rx) = mpsc::channel::<Bytes>(64);
        let body = Body::wrap_stream(ReceiverStream::new(audio_rx).map(Ok::<_, std::io::Error>));

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[
                ("sample_rate", sample_rate.to_string()),
                ("encoding", "pcm_s16le".to_string()),
            ])
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("failed to open stream: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Transcription(format!(
                "stream rejected with status {}",
                response.status()
            )));
        }

        let (event_tx, event_rx) = mpsc::channel(64);

        // Download half: NDJSON turn events until the server closes.
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buf = String::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::warn!("transcription stream ended with error: {}", e);
                        break;
                    }
                };
                buf.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buf.find('\n') {
                    let line: String = buf.drain(..=pos).collect();
                    if let Some(event) = parse_turn_line(line.trim()) {
                        if event_tx.send(event).await.is_err() {
                            // Session gone; stop reading.
                            return;
                        }
                    }
                }
            }
        });

        Ok((Box::new(TranscriberSink { audio_tx }), event_rx))
    }
}

/// The upload half of an open stream
struct TranscriberSink {
    audio_tx: mpsc::Sender<Bytes>,
}

#[async_trait]
impl TranscriptionSink for TranscriberSink {
    async fn feed(&mut self, chunk: AudioChunk) -> Result<()> {
        self.audio_tx
            .send(Bytes::from(chunk.data))
            .await
            .map_err(|_| Error::Transcription("transcription stream closed".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        // Dropping the sender ends the chunked upload; the server then
        // finishes its response and the event channel drains.
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TurnMessage {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    end_of_turn: bool,
}

fn parse_turn_line(line: &str) -> Option<TranscriptEvent> {
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<TurnMessage>(line) {
        Ok(msg) if msg.end_of_turn => Some(TranscriptEvent::finalized(msg.transcript)),
        Ok(msg) => Some(TranscriptEvent::partial(msg.transcript)),
        Err(e) => {
            tracing::debug!("skipping unparseable turn line: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_line() {
        let event = parse_turn_line(r#"{"transcript":"tell me","end_of_turn":false}"#);
        assert_eq!(event, Some(TranscriptEvent::partial("tell me")));
    }

    #[test]
    fn test_parse_final_line() {
        let event = parse_turn_line(r#"{"transcript":"tell me a story","end_of_turn":true}"#);
        assert_eq!(event, Some(TranscriptEvent::finalized("tell me a story")));
    }

    #[test]
    fn test_parse_skips_garbage() {
        assert_eq!(parse_turn_line(""), None);
        assert_eq!(parse_turn_line("not json"), None);
    }

    #[test]
    fn test_parse_missing_fields_default() {
        let event = parse_turn_line("{}");
        assert_eq!(event, Some(TranscriptEvent::partial("")));
    }
}
