//! Synthesis collaborator seam.

use async_trait::async_trait;

use crate::error::AiResult;
use crate::types::lot::ConsolidatedLot;

/// External summarization service.
///
/// Turns the final consolidated lot list into free-text commentary. A
/// synthesis failure never invalidates the lot list it was given.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Produce a free-text report over the consolidated lots.
    async fn synthesize(&self, lots: &[ConsolidatedLot]) -> AiResult<String>;
}
