use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cadence::interval::IntervalAnomalyDetector;
use crate::graph::clusters::ClusterAnalyzer;
use crate::phrases::normalize::{CleaningRule, DEFAULT_CLEANING_PATTERN};
use crate::phrases::repetition::PhraseRepetitionDetector;
use crate::pipeline::scan::Scanner;
use crate::sentiment::aggregate::SentimentAggregator;
use crate::sentiment::lexicon::LexiconScorer;
use crate::sentiment::traits::PolarityScorer;

/// Central configuration loaded from environment variables.
///
/// Every value has a default, so an empty environment is valid. The .env
/// file is loaded automatically at startup via dotenvy. CLI flags override
/// these per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Seconds; mean or single gaps below this are suspicious (BOTWATCH_INTERVAL_THRESHOLD)
    pub interval_threshold: f64,
    /// Standard deviations below the mean for a burst (BOTWATCH_OUTLIER_STDDEV)
    pub outlier_threshold_stddev: f64,
    /// Phrases seen more often than this are flagged (BOTWATCH_REPETITION_THRESHOLD)
    pub repetition_threshold: usize,
    /// Regex of characters stripped before counting (BOTWATCH_CLEANING_PATTERN)
    pub cleaning_pattern: String,
    /// Components larger than this are flagged (BOTWATCH_CLUSTER_THRESHOLD)
    pub cluster_threshold: usize,
    /// Scoring calls in flight at once (BOTWATCH_SENTIMENT_CONCURRENCY)
    pub sentiment_concurrency: usize,
    /// Per-post scoring time limit (BOTWATCH_SENTIMENT_TIMEOUT_MS)
    pub sentiment_timeout: Duration,
    /// Extra lexicon entries as a JSON object (BOTWATCH_LEXICON_PATH)
    pub lexicon_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_threshold: 30.0,
            outlier_threshold_stddev: 2.0,
            repetition_threshold: 5,
            cleaning_pattern: DEFAULT_CLEANING_PATTERN.to_string(),
            cluster_threshold: 20,
            sentiment_concurrency: 8,
            sentiment_timeout: Duration::from_millis(5000),
            lexicon_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any name -> value lookup. Unset names fall back
    /// to defaults; set but unparseable names are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            interval_threshold: parse_var(
                &lookup,
                "BOTWATCH_INTERVAL_THRESHOLD",
                defaults.interval_threshold,
            )?,
            outlier_threshold_stddev: parse_var(
                &lookup,
                "BOTWATCH_OUTLIER_STDDEV",
                defaults.outlier_threshold_stddev,
            )?,
            repetition_threshold: parse_var(
                &lookup,
                "BOTWATCH_REPETITION_THRESHOLD",
                defaults.repetition_threshold,
            )?,
            cleaning_pattern: lookup("BOTWATCH_CLEANING_PATTERN")
                .unwrap_or(defaults.cleaning_pattern),
            cluster_threshold: parse_var(
                &lookup,
                "BOTWATCH_CLUSTER_THRESHOLD",
                defaults.cluster_threshold,
            )?,
            sentiment_concurrency: parse_var(
                &lookup,
                "BOTWATCH_SENTIMENT_CONCURRENCY",
                defaults.sentiment_concurrency,
            )?,
            sentiment_timeout: Duration::from_millis(parse_var(
                &lookup,
                "BOTWATCH_SENTIMENT_TIMEOUT_MS",
                defaults.sentiment_timeout.as_millis() as u64,
            )?),
            lexicon_path: lookup("BOTWATCH_LEXICON_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values no analyzer can work with.
    pub fn validate(&self) -> Result<()> {
        if !self.interval_threshold.is_finite() || self.interval_threshold < 0.0 {
            anyhow::bail!(
                "Interval threshold must be a non-negative number of seconds, got {}",
                self.interval_threshold
            );
        }
        if !self.outlier_threshold_stddev.is_finite() || self.outlier_threshold_stddev < 0.0 {
            anyhow::bail!(
                "Outlier threshold must be a non-negative number of standard deviations, got {}",
                self.outlier_threshold_stddev
            );
        }
        if self.sentiment_concurrency == 0 {
            anyhow::bail!("Sentiment concurrency must be at least 1");
        }
        if self.sentiment_timeout.is_zero() {
            anyhow::bail!("Sentiment timeout must be greater than zero");
        }
        Ok(())
    }

    pub fn interval_detector(&self) -> IntervalAnomalyDetector {
        IntervalAnomalyDetector {
            interval_threshold: self.interval_threshold,
            outlier_threshold_stddev: self.outlier_threshold_stddev,
        }
    }

    pub fn phrase_detector(&self) -> Result<PhraseRepetitionDetector> {
        Ok(PhraseRepetitionDetector {
            repetition_threshold: self.repetition_threshold,
            cleaning: CleaningRule::new(&self.cleaning_pattern)?,
        })
    }

    pub fn cluster_analyzer(&self) -> ClusterAnalyzer {
        ClusterAnalyzer {
            cluster_threshold: self.cluster_threshold,
        }
    }

    /// The default lexicon scorer, extended from BOTWATCH_LEXICON_PATH if set.
    pub fn lexicon_scorer(&self) -> Result<LexiconScorer> {
        let scorer = LexiconScorer::default();
        match &self.lexicon_path {
            Some(path) => scorer.with_lexicon_file(path),
            None => Ok(scorer),
        }
    }

    pub fn sentiment_aggregator<S: PolarityScorer>(&self, scorer: S) -> SentimentAggregator<S> {
        SentimentAggregator::new(scorer)
            .with_concurrency(self.sentiment_concurrency)
            .with_timeout(self.sentiment_timeout)
    }

    /// All four analyzers with this config's thresholds.
    pub fn scanner<S: PolarityScorer>(&self, scorer: S) -> Result<Scanner<S>> {
        Ok(Scanner {
            interval: self.interval_detector(),
            phrases: self.phrase_detector()?,
            sentiment: self.sentiment_aggregator(scorer),
            clusters: self.cluster_analyzer(),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        _ => Ok(default),
    }
}
