//! Speech synthesis client (Murf-style streaming endpoint)

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc;

use stellar_config::SynthesisConfig;
use stellar_core::{AudioChunk, Error, Result, SynthesisEngine};

/// Streaming text-to-speech client
pub struct MurfSynthesizer {
    client: Client,
    config: SynthesisConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    format: &'a str,
    sample_rate: u32,
}

impl MurfSynthesizer {
    pub fn new(config: SynthesisConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Synthesis(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SynthesisEngine for MurfSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<mpsc::Receiver<AudioChunk>> {
        let request = SynthesisRequest {
            text,
            voice_id: &self.config.voice_id,
            format: "WAV",
            sample_rate: 44_100,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "engine returned {}: {}",
                status, body
            )));
        }

        let (tx, rx) = mpsc::channel(32);

        // Forward response bytes chunk by chunk; order is the delivery
        // order. A mid-stream transport error truncates the audio, it
        // does not restart the turn.
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(bytes) if bytes.is_empty() => continue,
                    Ok(bytes) => {
                        if tx.send(AudioChunk::outbound(bytes.to_vec())).await.is_err() {
                            // Receiver gone, turn abandoned.
                            return;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("synthesis stream ended with error: {}", e);
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = SynthesisRequest {
            text: "hello there",
            voice_id: "en-US-amara",
            format: "WAV",
            sample_rate: 44_100,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "hello there");
        assert_eq!(json["voiceId"], "en-US-amara");
        assert_eq!(json["sampleRate"], 44_100);
    }
}
