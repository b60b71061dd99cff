//! Configuration for the voice session server
//!
//! Settings are loaded from, highest priority first:
//! - Environment variables (`STELLAR_VOICE__` prefix, `__` separator)
//! - `config/{env}.yaml` (when an environment name is given)
//! - `config/default.yaml`
//!
//! Every field has a serde default, so the server starts with no config
//! files present at all.

pub mod persona;
pub mod settings;

pub use persona::PersonaConfig;
pub use settings::{
    load_settings, EnginesConfig, FactsConfig, ObservabilityConfig, ResponderConfig,
    RuntimeEnvironment, ServerConfig, SessionConfig, Settings, SynthesisConfig,
    TranscriptionConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
