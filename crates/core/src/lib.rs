//! Core traits and types for the stellar-voice duplex session orchestrator
//!
//! This crate provides the foundational types used across all other crates:
//! - Engine traits for pluggable backends (transcription, response, synthesis)
//! - Audio chunk and transcript event types
//! - Conversation history types
//! - Error types

pub mod audio;
pub mod conversation;
pub mod error;
pub mod transcript;

pub mod traits;

pub use audio::{AudioChunk, AudioDirection};
pub use conversation::{ConversationHistory, ResponseResult, Turn, TurnRole};
pub use error::{Error, Result};
pub use transcript::{TranscriptEvent, Utterance};

pub use traits::{
    FactSource, Message, ResponseEngine, Role, SynthesisEngine, TranscriptionEngine,
    TranscriptionSink,
};
