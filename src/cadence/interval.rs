// Interval anomaly detection: rapid-fire posting and unusual bursts.
//
// For each account we sort its parsed timestamps and look at the gaps
// between neighbours. Two rules flag an account:
// - Cadence: the mean gap is below the interval threshold.
// - Burst: some gap is below the threshold AND more than k sample standard
//   deviations below the account's own mean gap. Needs at least two gaps.
// An account flagged by both rules is still reported once.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::timestamps::parse_timestamp;
use crate::diagnostics::{record, Analysis, AnalyzerKind, Diagnostic};
use crate::snapshot::{self, ActivityLog};

/// Which rule flagged an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceRule {
    /// Mean gap below the threshold
    Cadence,
    /// One gap far below the account's own baseline
    Burst,
}

impl CadenceRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            CadenceRule::Cadence => "cadence",
            CadenceRule::Burst => "burst",
        }
    }
}

/// Flags accounts whose posts are spaced abnormally close together.
#[derive(Debug, Clone)]
pub struct IntervalAnomalyDetector {
    /// Gaps (and mean gaps) below this many seconds are suspicious (default 30)
    pub interval_threshold: f64,
    /// How many standard deviations below the mean a gap must sit to count
    /// as a burst (default 2)
    pub outlier_threshold_stddev: f64,
}

impl Default for IntervalAnomalyDetector {
    fn default() -> Self {
        Self {
            interval_threshold: 30.0,
            outlier_threshold_stddev: 2.0,
        }
    }
}

impl IntervalAnomalyDetector {
    /// Run the detector over a typed activity log.
    ///
    /// Returns flagged account identifiers in identifier order. Unparseable
    /// timestamps are dropped individually; accounts left with fewer than
    /// two instants are skipped, never flagged.
    pub fn detect(&self, log: &ActivityLog) -> Analysis<Vec<String>> {
        let mut flagged: BTreeSet<String> = BTreeSet::new();
        let mut diagnostics = Vec::new();

        for (account, raw) in log {
            let mut instants: Vec<DateTime<Utc>> = Vec::with_capacity(raw.len());
            for ts in raw {
                match parse_timestamp(ts) {
                    Ok(instant) => instants.push(instant),
                    Err(e) => record(
                        &mut diagnostics,
                        Diagnostic::UnparseableTimestamp {
                            account: account.clone(),
                            value: ts.clone(),
                            reason: e.to_string(),
                        },
                    ),
                }
            }

            if instants.len() < 2 {
                debug!(
                    account = account.as_str(),
                    parsed = instants.len(),
                    "Too few timestamps for interval analysis, skipping"
                );
                continue;
            }

            let gaps = gaps_in_seconds(&mut instants);
            if let Some(rule) = self.evaluate(&gaps) {
                info!(
                    account = account.as_str(),
                    rule = rule.as_str(),
                    mean_gap = %format!("{:.1}", mean(&gaps)),
                    posts = instants.len(),
                    "Flagged posting cadence"
                );
                flagged.insert(account.clone());
            }
        }

        info!(
            accounts = log.len(),
            flagged = flagged.len(),
            skipped = diagnostics.len(),
            "Interval analysis complete"
        );

        Analysis::new(flagged.into_iter().collect(), diagnostics)
    }

    /// Run the detector over untyped JSON (`{"account": ["ts", ...]}`).
    pub fn detect_value(&self, value: &Value) -> Analysis<Vec<String>> {
        match snapshot::load_activity(value) {
            Ok(loaded) => self.detect(&loaded.value).with_prior(loaded.diagnostics),
            Err(e) => Analysis::structural(AnalyzerKind::Cadence, e),
        }
    }

    /// Decide whether a set of gaps is anomalous. The cadence rule is
    /// checked first, so it wins when both apply.
    pub fn evaluate(&self, gaps: &[f64]) -> Option<CadenceRule> {
        if gaps.is_empty() {
            return None;
        }

        let avg = mean(gaps);
        if avg < self.interval_threshold {
            return Some(CadenceRule::Cadence);
        }

        // One gap has no spread to measure against
        let stddev = sample_stddev(gaps)?;
        let floor = avg - self.outlier_threshold_stddev * stddev;
        gaps.iter()
            .any(|&gap| gap < self.interval_threshold && gap < floor)
            .then_some(CadenceRule::Burst)
    }
}

/// Sort instants in place and return the `n - 1` gaps between neighbours,
/// in seconds.
pub fn gaps_in_seconds(instants: &mut [DateTime<Utc>]) -> Vec<f64> {
    instants.sort();
    instants
        .windows(2)
        .map(|pair| {
            let gap = pair[1] - pair[0];
            match gap.num_microseconds() {
                Some(micros) => micros as f64 / 1_000_000.0,
                // Microseconds overflow past ~292k years apart
                None => gap.num_milliseconds() as f64 / 1000.0,
            }
        })
        .collect()
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). None below two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
