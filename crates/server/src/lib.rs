//! WebSocket voice session server
//!
//! Accepts one duplex connection per session, gates credentials, wires
//! the transcription/response/synthesis engines together, and streams
//! partial transcripts and synthesized speech back to the client.

pub mod credentials;
pub mod egress;
pub mod http;
pub mod ingress;
pub mod metrics;
pub mod outbound;
pub mod session;
pub mod state;

pub use credentials::SessionCredentials;
pub use http::create_router;
pub use metrics::init_metrics;
pub use outbound::OutboundFrame;
pub use session::VoiceSession;
pub use state::AppState;

use thiserror::Error;

/// Server errors
///
/// All of these are connection-local: any one of them ends the session
/// and returns the server to accepting new connections. Turn-local
/// failures live in `stellar_core::Error` and never reach this type.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Ingress error: {0}")]
    Ingress(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Session error: {0}")]
    Session(String),
}
