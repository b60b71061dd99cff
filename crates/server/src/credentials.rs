//! Credential gate
//!
//! Each connection must present one opaque key per external engine as
//! query parameters. Validation happens before the transcription
//! stream is opened; a missing or empty key closes the WebSocket with
//! a policy-violation code and a human-readable reason. No retry on
//! the same connection.

use std::collections::HashMap;

use crate::ServerError;

/// WebSocket close code sent on credential rejection (policy violation)
pub const POLICY_VIOLATION: u16 = 1008;

const TRANSCRIPTION_KEY: &str = "transcription_key";
const RESPONDER_KEY: &str = "responder_key";
const SYNTHESIS_KEY: &str = "synthesis_key";

/// The three opaque engine credentials for one session
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub transcription_key: String,
    pub responder_key: String,
    pub synthesis_key: String,
}

impl SessionCredentials {
    /// Validate and extract credentials from connection query parameters
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, ServerError> {
        Ok(Self {
            transcription_key: required(params, TRANSCRIPTION_KEY)?,
            responder_key: required(params, RESPONDER_KEY)?,
            synthesis_key: required(params, SYNTHESIS_KEY)?,
        })
    }
}

fn required(params: &HashMap<String, String>, name: &str) -> Result<String, ServerError> {
    match params.get(name) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        Some(_) => Err(ServerError::Credentials(format!(
            "credential '{}' is empty",
            name
        ))),
        None => Err(ServerError::Credentials(format!(
            "credential '{}' is missing",
            name
        ))),
    }
}
