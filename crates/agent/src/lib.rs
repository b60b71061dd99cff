//! Turn-level logic: transcript aggregation and response routing

pub mod aggregator;
pub mod router;

pub use aggregator::{TranscriptAggregator, TurnUpdate};
pub use router::{Intent, ResponseRouter};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Intent classification failed; recovered internally by falling
    /// back to general chat, never surfaced past the router.
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Response generation failed; propagates to the session as a
    /// recoverable turn error.
    #[error("Generation failed: {0}")]
    Generation(String),
}
