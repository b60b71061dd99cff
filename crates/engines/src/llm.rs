//! Response generation client (Gemini-style `generateContent` API)
//!
//! Transient failures (network errors, 5xx) are retried with
//! exponential backoff; 4xx and malformed responses fail immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use stellar_config::ResponderConfig;
use stellar_core::{Error, Message, ResponseEngine, Result};

const CLASSIFY_LABELS: &str = "general-chat, story-request, fact-lookup";

/// Response generation client
pub struct GeminiClient {
    client: Client,
    config: ResponderConfig,
    api_key: String,
}

enum CallError {
    Retryable(String),
    Fatal(String),
}

impl CallError {
    fn into_message(self) -> String {
        match self {
            CallError::Retryable(msg) | CallError::Fatal(msg) => msg,
        }
    }
}

impl GeminiClient {
    pub fn new(config: ResponderConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Generation(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    async fn execute(&self, request: &GenerateRequest) -> std::result::Result<String, CallError> {
        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CallError::Retryable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let msg = format!("engine returned {}: {}", status, body);
            // 5xx is transient, 4xx is not.
            return if status.is_server_error() {
                Err(CallError::Retryable(msg))
            } else {
                Err(CallError::Fatal(msg))
            };
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CallError::Fatal(format!("invalid response: {}", e)))?;

        parsed
            .into_text()
            .ok_or_else(|| CallError::Fatal("response carried no candidates".to_string()))
    }

    /// Retry loop with exponential backoff over `execute`
    async fn call(&self, messages: &[Message]) -> std::result::Result<String, String> {
        let request = GenerateRequest::from_messages(messages);
        let mut backoff = Duration::from_millis(self.config.retry_backoff_ms);
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    attempt,
                    max = self.config.max_retries,
                    "generation request failed, retrying in {:?}",
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute(&request).await {
                Ok(text) => return Ok(text),
                Err(CallError::Retryable(msg)) => last_error = Some(msg),
                Err(err @ CallError::Fatal(_)) => return Err(err.into_message()),
            }
        }

        Err(last_error.unwrap_or_else(|| "max retries exceeded".to_string()))
    }
}

#[async_trait]
impl ResponseEngine for GeminiClient {
    async fn classify(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Classify the following utterance into exactly one of these \
             labels: {labels}. Reply with the label only, nothing else.\n\n\
             Utterance: {text}",
            labels = CLASSIFY_LABELS,
            text = text,
        );
        let messages = [Message::user(prompt)];

        let label = self.call(&messages).await.map_err(Error::Classification)?;
        Ok(label.trim().to_string())
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        self.call(messages).await.map_err(Error::Generation)
    }
}

// generateContent API types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn from_messages(messages: &[Message]) -> Self {
        Self {
            contents: messages
                .iter()
                .map(|m| Content {
                    role: m.role.to_string(),
                    parts: vec![Part {
                        text: m.content.clone(),
                    }],
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let messages = [Message::user("hello"), Message::model("well met")];
        let request = GenerateRequest::from_messages(&messages);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Once "},{"text":"upon a time"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Once upon a time"));
    }

    #[test]
    fn test_empty_response_is_none() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.into_text().is_none());
    }
}
