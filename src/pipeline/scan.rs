// Snapshot scan: one snapshot in, one combined report out.
//
// The four analyzers are independent. Each reads only its own section of
// the snapshot and none sees another's output; the report just collects
// them side by side. A missing section leaves its slot empty instead of
// being treated as a structural error.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::info;

use crate::cadence::interval::IntervalAnomalyDetector;
use crate::diagnostics::Analysis;
use crate::graph::clusters::ClusterAnalyzer;
use crate::phrases::repetition::PhraseRepetitionDetector;
use crate::sentiment::aggregate::{SentimentAggregator, SentimentSummary};
use crate::sentiment::traits::PolarityScorer;
use crate::snapshot::Snapshot;

/// Everything one scan found, section by section.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    /// Accounts flagged for posting cadence
    pub suspicious_accounts: Option<Analysis<Vec<String>>>,
    /// Normalized phrases repeated beyond the threshold
    pub repeated_phrases: Option<Analysis<Vec<String>>>,
    /// Mean polarity of the corpus
    pub sentiment: Option<Analysis<SentimentSummary>>,
    /// Friend-graph components above the size threshold
    pub clusters: Option<Analysis<Vec<BTreeSet<String>>>>,
}

impl ScanReport {
    /// Total diagnostics across all sections.
    pub fn diagnostic_count(&self) -> usize {
        self.suspicious_accounts
            .as_ref()
            .map_or(0, |a| a.diagnostics.len())
            + self
                .repeated_phrases
                .as_ref()
                .map_or(0, |a| a.diagnostics.len())
            + self.sentiment.as_ref().map_or(0, |a| a.diagnostics.len())
            + self.clusters.as_ref().map_or(0, |a| a.diagnostics.len())
    }

    /// Flagged accounts, phrases and clusters combined. Sentiment is a
    /// measurement, not a flag, so it doesn't count.
    pub fn flag_count(&self) -> usize {
        self.suspicious_accounts
            .as_ref()
            .map_or(0, |a| a.output.len())
            + self.repeated_phrases.as_ref().map_or(0, |a| a.output.len())
            + self.clusters.as_ref().map_or(0, |a| a.output.len())
    }
}

/// The four analyzers, configured and ready to run.
pub struct Scanner<S> {
    pub interval: IntervalAnomalyDetector,
    pub phrases: PhraseRepetitionDetector,
    pub sentiment: SentimentAggregator<S>,
    pub clusters: ClusterAnalyzer,
}

impl<S: PolarityScorer> Scanner<S> {
    /// Scanner with default thresholds around the given scorer.
    pub fn with_scorer(scorer: S) -> Self {
        Self {
            interval: IntervalAnomalyDetector::default(),
            phrases: PhraseRepetitionDetector::default(),
            sentiment: SentimentAggregator::new(scorer),
            clusters: ClusterAnalyzer::default(),
        }
    }

    pub async fn run(&self, snapshot: &Snapshot) -> ScanReport {
        self.run_with_progress(snapshot, None).await
    }

    /// Run every analyzer whose section is present. `progress` ticks once
    /// per post scored for sentiment.
    pub async fn run_with_progress(
        &self,
        snapshot: &Snapshot,
        progress: Option<&ProgressBar>,
    ) -> ScanReport {
        let suspicious_accounts = snapshot
            .activity
            .as_ref()
            .map(|value| self.interval.detect_value(value));

        let repeated_phrases = snapshot
            .posts
            .as_ref()
            .map(|value| self.phrases.detect_value(value));

        let sentiment = match &snapshot.posts {
            Some(value) => Some(
                self.sentiment
                    .aggregate_value_with_progress(value, progress)
                    .await,
            ),
            None => None,
        };

        let clusters = snapshot
            .friends
            .as_ref()
            .map(|value| self.clusters.detect_value(value));

        let report = ScanReport {
            generated_at: Utc::now(),
            suspicious_accounts,
            repeated_phrases,
            sentiment,
            clusters,
        };

        info!(
            flags = report.flag_count(),
            diagnostics = report.diagnostic_count(),
            "Scan complete"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::lexicon::LexiconScorer;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_sections_stay_empty() {
        let scanner = Scanner::with_scorer(LexiconScorer::default());
        let snapshot = Snapshot::from_value(json!({"posts": ["great", "great"]})).unwrap();
        let report = scanner.run(&snapshot).await;

        assert!(report.suspicious_accounts.is_none());
        assert!(report.clusters.is_none());
        assert!(report.repeated_phrases.is_some());
        assert_eq!(report.sentiment.unwrap().output.scored, 2);
    }

    #[tokio::test]
    async fn test_structural_error_only_affects_its_section() {
        let scanner = Scanner::with_scorer(LexiconScorer::default());
        let snapshot = Snapshot::from_value(json!({
            "activity": ["not", "an", "object"],
            "friends": {"a": ["b"]},
        }))
        .unwrap();
        let report = scanner.run(&snapshot).await;

        assert!(report.suspicious_accounts.as_ref().unwrap().is_aborted());
        assert!(!report.clusters.as_ref().unwrap().is_aborted());
        assert_eq!(report.diagnostic_count(), 1);
    }
}
