//! HTTP clients for the external engines
//!
//! One client per collaborator, each implementing the matching trait
//! from `stellar-core`. Clients are built per session from that
//! session's credentials; nothing in here is process-global.

pub mod facts;
pub mod llm;
pub mod stt;
pub mod tts;

pub use facts::IssLocator;
pub use llm::GeminiClient;
pub use stt::StreamingTranscriber;
pub use tts::MurfSynthesizer;
