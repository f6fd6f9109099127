// Phrase repetition detection.
//
// Every post is normalized into a key and counted across the whole corpus.
// Keys seen strictly more than `repetition_threshold` times are reported,
// in the order they first appeared.

use std::collections::HashMap;

use serde_json::Value;
use tracing::info;

use super::normalize::CleaningRule;
use crate::diagnostics::{Analysis, AnalyzerKind};
use crate::snapshot;

/// Frequency count per normalized key, remembering first-seen order.
#[derive(Debug, Clone, Default)]
pub struct PhraseCounts {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl PhraseCounts {
    pub fn observe(&mut self, key: String) {
        match self.counts.get_mut(&key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.clone());
                self.counts.insert(key, 1);
            }
        }
    }

    /// Fold in counts from another chunk of the same corpus. Keys new to
    /// `self` are appended in the other chunk's first-seen order, so merging
    /// chunks in corpus order matches counting the whole corpus at once.
    pub fn merge(&mut self, other: PhraseCounts) {
        let PhraseCounts { mut counts, order } = other;
        for key in order {
            let n = counts.remove(&key).unwrap_or(0);
            match self.counts.get_mut(&key) {
                Some(count) => *count += n,
                None => {
                    self.order.push(key.clone());
                    self.counts.insert(key, n);
                }
            }
        }
    }

    pub fn count(&self, key: &str) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys counted strictly more than `threshold` times, first-seen order.
    pub fn repeated(&self, threshold: usize) -> Vec<String> {
        self.order
            .iter()
            .filter(|key| self.count(key) > threshold)
            .cloned()
            .collect()
    }
}

/// Flags normalized text repeated beyond a threshold.
#[derive(Debug, Clone)]
pub struct PhraseRepetitionDetector {
    /// Keys seen more than this many times are flagged (default 5)
    pub repetition_threshold: usize,
    pub cleaning: CleaningRule,
}

impl Default for PhraseRepetitionDetector {
    fn default() -> Self {
        Self {
            repetition_threshold: 5,
            cleaning: CleaningRule::default(),
        }
    }
}

impl PhraseRepetitionDetector {
    /// Count normalized keys across a corpus.
    pub fn count(&self, posts: &[String]) -> PhraseCounts {
        let mut counts = PhraseCounts::default();
        for post in posts {
            counts.observe(self.cleaning.normalize(post));
        }
        counts
    }

    pub fn detect(&self, posts: &[String]) -> Analysis<Vec<String>> {
        let counts = self.count(posts);
        let repeated = counts.repeated(self.repetition_threshold);

        info!(
            posts = posts.len(),
            distinct = counts.len(),
            repeated = repeated.len(),
            threshold = self.repetition_threshold,
            "Phrase repetition analysis complete"
        );

        Analysis::new(repeated, Vec::new())
    }

    /// Run over untyped JSON (a list of posts). Non-string entries are
    /// skipped and don't count toward any key.
    pub fn detect_value(&self, value: &Value) -> Analysis<Vec<String>> {
        match snapshot::load_posts(value) {
            Ok(loaded) => self.detect(&loaded.value).with_prior(loaded.diagnostics),
            Err(e) => Analysis::structural(AnalyzerKind::Phrases, e),
        }
    }
}
