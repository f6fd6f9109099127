// Polarity scorer trait: the swap-ready abstraction.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for scoring the polarity of a text. Async because a remote or
/// model-backed provider may block for a while; the aggregator bounds how
/// many calls run at once and how long each may take.
///
/// Contract: scores fall in [-1.0, 1.0] and identical input gives an
/// identical score. Anything outside the range is treated as a failure.
#[async_trait]
pub trait PolarityScorer: Send + Sync {
    async fn score_text(&self, text: &str) -> Result<f64>;
}
