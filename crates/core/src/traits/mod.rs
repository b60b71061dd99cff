//! Engine traits
//!
//! The three external engines (transcription, response generation,
//! speech synthesis) and the fact collaborator are consumed through
//! these traits. Concrete HTTP clients live in `stellar-engines`;
//! tests substitute mocks.

pub mod facts;
pub mod llm;
pub mod speech;

pub use facts::FactSource;
pub use llm::{Message, ResponseEngine, Role};
pub use speech::{SynthesisEngine, TranscriptionEngine, TranscriptionSink};
