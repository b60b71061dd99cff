//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, PersonaConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// External engine endpoints and models
    #[serde(default)]
    pub engines: EnginesConfig,

    /// Per-session channel and stream tuning
    #[serde(default)]
    pub session: SessionConfig,

    /// Persona text the responder speaks with
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.session.audio_buffer_frames == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.audio_buffer_frames".to_string(),
                message: "Audio buffer must hold at least 1 frame".to_string(),
            });
        }

        if self.session.sample_rate_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.sample_rate_hz".to_string(),
                message: "Sample rate must be positive".to_string(),
            });
        }

        if self.engines.responder.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engines.responder.max_retries".to_string(),
                message: "At least one attempt is required".to_string(),
            });
        }

        if self.environment.is_production()
            && self.server.cors_enabled
            && self.server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// WebSocket path
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_ws_path() -> String {
    "/ws".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            cors_enabled: default_true(),
            // Empty by default: must be explicitly configured for production.
            cors_origins: Vec::new(),
        }
    }
}

/// External engine configuration
///
/// Credentials are NOT part of the settings: each connection carries its
/// own keys and clients are built per session from those.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnginesConfig {
    /// Streaming transcription engine
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Response generation engine
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Speech synthesis engine
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Fact lookup collaborator
    #[serde(default)]
    pub facts: FactsConfig,
}

/// Streaming transcription engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Streaming endpoint URL
    #[serde(default = "default_transcription_endpoint")]
    pub endpoint: String,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

fn default_transcription_endpoint() -> String {
    "https://streaming.assemblyai.com/v3/stream".to_string()
}
fn default_connect_timeout() -> u64 {
    10
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_transcription_endpoint(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

/// Response generation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// API base URL
    #[serde(default = "default_responder_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_responder_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Attempts per request, including the first
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds, doubled per attempt
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_responder_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_responder_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff() -> u64 {
    250
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_responder_endpoint(),
            model: default_responder_model(),
            timeout_seconds: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

/// Speech synthesis engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Streaming endpoint URL
    #[serde(default = "default_synthesis_endpoint")]
    pub endpoint: String,

    /// Voice identifier
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_synthesis_endpoint() -> String {
    "https://api.murf.ai/v1/speech/stream".to_string()
}
fn default_voice_id() -> String {
    "en-US-amara".to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_synthesis_endpoint(),
            voice_id: default_voice_id(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

/// Fact lookup settings (ISS position and crew)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactsConfig {
    /// Current position endpoint
    #[serde(default = "default_position_url")]
    pub position_url: String,

    /// Crew roster endpoint
    #[serde(default = "default_crew_url")]
    pub crew_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_facts_timeout")]
    pub timeout_seconds: u64,
}

fn default_position_url() -> String {
    "http://api.open-notify.org/iss-now.json".to_string()
}
fn default_crew_url() -> String {
    "http://api.open-notify.org/astros.json".to_string()
}
fn default_facts_timeout() -> u64 {
    5
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            position_url: default_position_url(),
            crew_url: default_crew_url(),
            timeout_seconds: default_facts_timeout(),
        }
    }
}

/// Per-session tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Inbound audio sample rate in Hz (mono PCM)
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,

    /// Inbound audio frames buffered between socket and transcription
    #[serde(default = "default_audio_buffer")]
    pub audio_buffer_frames: usize,
}

fn default_sample_rate() -> u32 {
    16_000
}
fn default_audio_buffer() -> usize {
    100
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate(),
            audio_buffer_frames: default_audio_buffer(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (STELLAR_VOICE__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("STELLAR_VOICE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.session.sample_rate_hz, 16_000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 8080;
        settings.session.audio_buffer_frames = 0;
        assert!(settings.validate().is_err());

        settings.session.audio_buffer_frames = 100;
        settings.engines.responder.max_retries = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_engine_defaults() {
        let engines = EnginesConfig::default();
        assert!(engines.responder.endpoint.starts_with("https://"));
        assert_eq!(engines.responder.max_retries, 3);
        assert!(engines.facts.position_url.contains("iss-now"));
    }
}
