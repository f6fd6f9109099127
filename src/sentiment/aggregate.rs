// Sentiment aggregation: mean polarity over a post corpus.
//
// Posts are scored concurrently through buffer_unordered, capped at
// `concurrency` calls in flight, and each call gets its own timeout. A
// failure, a timeout, or an out-of-range score drops only that post. The
// mean is 0.0 when nothing could be scored, so callers should check
// `scored` before reading 0.0 as neutral.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::traits::PolarityScorer;
use crate::diagnostics::{record, Analysis, AnalyzerKind, Diagnostic};
use crate::snapshot;

/// Mean polarity of a corpus and how many posts contributed to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentSummary {
    /// Mean polarity in [-1, 1], or the 0.0 sentinel when `scored == 0`
    pub mean: f64,
    /// Posts that produced a valid score
    pub scored: usize,
}

impl SentimentSummary {
    /// False when the mean is the "no data" sentinel rather than a measurement.
    pub fn has_data(&self) -> bool {
        self.scored > 0
    }
}

/// Computes mean polarity over a corpus using a pluggable scorer.
pub struct SentimentAggregator<S> {
    scorer: S,
    /// Maximum scoring calls in flight (default 8)
    pub concurrency: usize,
    /// Per-call time limit (default 5s)
    pub timeout: Duration,
}

impl<S: PolarityScorer> SentimentAggregator<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            concurrency: 8,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub async fn aggregate(&self, posts: &[String]) -> Analysis<SentimentSummary> {
        self.aggregate_with_progress(posts, None).await
    }

    /// Same as `aggregate`, ticking `progress` once per post.
    pub async fn aggregate_with_progress(
        &self,
        posts: &[String],
        progress: Option<&ProgressBar>,
    ) -> Analysis<SentimentSummary> {
        if posts.is_empty() {
            info!("No posts provided for sentiment analysis");
            return Analysis::new(SentimentSummary::default(), Vec::new());
        }

        let timeout_ms = self.timeout.as_millis() as u64;

        let mut outcomes: Vec<(usize, Result<f64, Diagnostic>)> = stream::iter(
            posts.iter().enumerate().map(|(index, post)| async move {
                let outcome = match tokio::time::timeout(self.timeout, self.scorer.score_text(post))
                    .await
                {
                    Ok(Ok(score)) if score.is_finite() && (-1.0..=1.0).contains(&score) => {
                        Ok(score)
                    }
                    Ok(Ok(score)) => Err(Diagnostic::ScoringFailed {
                        index,
                        reason: format!("score {score} is outside [-1, 1]"),
                    }),
                    Ok(Err(e)) => Err(Diagnostic::ScoringFailed {
                        index,
                        reason: format!("{e:#}"),
                    }),
                    Err(_) => Err(Diagnostic::ScoringTimedOut { index, timeout_ms }),
                };
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                (index, outcome)
            }),
        )
        .buffer_unordered(self.concurrency.max(1))
        .collect()
        .await;

        // Completion order is arbitrary; sum and report in corpus order
        outcomes.sort_by_key(|(index, _)| *index);

        let mut diagnostics = Vec::new();
        let mut total = 0.0;
        let mut scored = 0;
        for (_, outcome) in outcomes {
            match outcome {
                Ok(score) => {
                    total += score;
                    scored += 1;
                }
                Err(diagnostic) => record(&mut diagnostics, diagnostic),
            }
        }

        if scored == 0 {
            info!(posts = posts.len(), "No valid posts for sentiment analysis");
            return Analysis::new(SentimentSummary::default(), diagnostics);
        }

        let summary = SentimentSummary {
            mean: total / scored as f64,
            scored,
        };

        info!(
            posts = posts.len(),
            scored,
            mean = %format!("{:.3}", summary.mean),
            "Sentiment analysis complete"
        );

        Analysis::new(summary, diagnostics)
    }

    /// Run over untyped JSON (a list of posts). Non-string entries are skipped.
    pub async fn aggregate_value(&self, value: &Value) -> Analysis<SentimentSummary> {
        self.aggregate_value_with_progress(value, None).await
    }

    pub async fn aggregate_value_with_progress(
        &self,
        value: &Value,
        progress: Option<&ProgressBar>,
    ) -> Analysis<SentimentSummary> {
        match snapshot::load_posts(value) {
            Ok(loaded) => self
                .aggregate_with_progress(&loaded.value, progress)
                .await
                .with_prior(loaded.diagnostics),
            Err(e) => Analysis::structural(AnalyzerKind::Sentiment, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    /// Scores a post by parsing it as a number.
    struct NumericScorer;

    #[async_trait]
    impl PolarityScorer for NumericScorer {
        async fn score_text(&self, text: &str) -> Result<f64> {
            Ok(text.trim().parse::<f64>()?)
        }
    }

    fn posts(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_mean_of_scores() {
        let aggregator = SentimentAggregator::new(NumericScorer);
        let result = aggregator.aggregate(&posts(&["0.5", "-0.25", "1.0"])).await;
        assert!((result.output.mean - 0.4166666).abs() < 1e-6);
        assert_eq!(result.output.scored, 3);
        assert!(result.is_clean());
    }

    #[tokio::test]
    async fn test_empty_corpus_is_sentinel() {
        let aggregator = SentimentAggregator::new(NumericScorer);
        let result = aggregator.aggregate(&[]).await;
        assert_eq!(result.output.mean, 0.0);
        assert!(!result.output.has_data());
    }

    #[tokio::test]
    async fn test_failures_and_out_of_range_are_excluded() {
        let aggregator = SentimentAggregator::new(NumericScorer).with_concurrency(2);
        let result = aggregator
            .aggregate(&posts(&["0.8", "not a number", "7.5", "0.2"]))
            .await;

        assert!((result.output.mean - 0.5).abs() < 1e-10);
        assert_eq!(result.output.scored, 2);
        assert_eq!(result.diagnostics.len(), 2);
        assert!(matches!(
            result.diagnostics[0],
            Diagnostic::ScoringFailed { index: 1, .. }
        ));
        assert!(matches!(
            result.diagnostics[1],
            Diagnostic::ScoringFailed { index: 2, .. }
        ));
    }

    #[test]
    fn test_concurrency_floor_is_one() {
        let aggregator = SentimentAggregator::new(NumericScorer).with_concurrency(0);
        assert_eq!(aggregator.concurrency, 1);
    }
}
