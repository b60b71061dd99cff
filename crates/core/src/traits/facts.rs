//! Fact source trait

use async_trait::async_trait;

/// A collaborator that answers a fixed factual question
///
/// Implementations never fail: when the upstream source is unreachable
/// they return a spoken-word placeholder instead of an error, so a fact
/// lookup can never take a session down.
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Fetch the current fact as speakable text
    async fn fetch(&self) -> String;
}
