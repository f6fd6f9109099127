// Lexicon polarity scorer: local, deterministic, no model files.
//
// Each token found in the lexicon contributes its polarity. A preceding
// intensifier ("very", "so") scales it, a preceding negation ("not",
// "never") flips and halves it. Modifiers only reach the next sentiment
// word within a short window. The post score is the mean contribution,
// clamped to [-1, 1]; a post with no sentiment words scores 0.0.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::traits::PolarityScorer;

/// Polarity of common sentiment-bearing words.
const BASE_LEXICON: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("love", 0.5),
    ("loved", 0.7),
    ("like", 0.2),
    ("nice", 0.6),
    ("happy", 0.8),
    ("glad", 0.5),
    ("wonderful", 1.0),
    ("fantastic", 0.4),
    ("beautiful", 0.85),
    ("perfect", 1.0),
    ("fun", 0.3),
    ("cool", 0.35),
    ("thanks", 0.2),
    ("thank", 0.2),
    ("win", 0.8),
    ("winning", 0.5),
    ("free", 0.4),
    ("exciting", 0.3),
    ("enjoy", 0.4),
    ("recommend", 0.3),
    ("support", 0.2),
    ("bad", -0.7),
    ("worse", -0.4),
    ("worst", -1.0),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("hate", -0.8),
    ("hated", -0.9),
    ("sad", -0.5),
    ("angry", -0.5),
    ("ugly", -0.7),
    ("stupid", -0.8),
    ("boring", -1.0),
    ("poor", -0.4),
    ("wrong", -0.5),
    ("fake", -0.5),
    ("scam", -0.8),
    ("disgusting", -1.0),
    ("annoying", -0.8),
    ("useless", -0.5),
    ("broken", -0.4),
    ("fail", -0.5),
    ("failed", -0.5),
    ("lies", -0.6),
    ("corrupt", -0.5),
    ("disaster", -0.8),
    ("pathetic", -1.0),
    ("sick", -0.7),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("so", 1.2),
    ("extremely", 1.5),
    ("super", 1.3),
    ("totally", 1.3),
    ("absolutely", 1.4),
    ("slightly", 0.5),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "isnt", "dont", "cant", "wont"];

/// A negation flips the polarity and dampens it.
const NEGATION_FACTOR: f64 = -0.5;

/// How many plain tokens a modifier survives before it lapses.
const MODIFIER_WINDOW: usize = 2;

/// Lexicon-based polarity scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            words: BASE_LEXICON
                .iter()
                .map(|&(w, p)| (w.to_string(), p))
                .collect(),
            intensifiers: INTENSIFIERS
                .iter()
                .map(|&(w, m)| (w.to_string(), m))
                .collect(),
        }
    }
}

impl LexiconScorer {
    /// Add or override word polarities. Values must be in [-1, 1].
    pub fn with_entries(mut self, entries: HashMap<String, f64>) -> Result<Self> {
        for (word, polarity) in entries {
            if !polarity.is_finite() || !(-1.0..=1.0).contains(&polarity) {
                anyhow::bail!(
                    "Lexicon entry {word:?} has polarity {polarity}, expected -1.0 to 1.0"
                );
            }
            self.words.insert(word.to_lowercase(), polarity);
        }
        Ok(self)
    }

    /// Load extra entries from a JSON object of `{"word": polarity}`.
    pub fn with_lexicon_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon {}", path.display()))?;
        let entries: HashMap<String, f64> = serde_json::from_str(&raw).with_context(|| {
            format!(
                "Lexicon {} must be a JSON object of word -> number",
                path.display()
            )
        })?;
        self.with_entries(entries)
    }

    /// Number of words with a polarity.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Score a text synchronously.
    pub fn polarity(&self, text: &str) -> f64 {
        let mut contributions = Vec::new();
        let mut multiplier = 1.0;
        let mut negated = false;
        let mut since_modifier = 0;

        for token in tokenize(text) {
            if let Some(&m) = self.intensifiers.get(&token) {
                multiplier *= m;
                since_modifier = 0;
                continue;
            }
            if NEGATIONS.contains(&token.as_str()) {
                negated = !negated;
                since_modifier = 0;
                continue;
            }

            if let Some(&polarity) = self.words.get(&token) {
                let mut score = polarity * multiplier;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                contributions.push(score.clamp(-1.0, 1.0));
                multiplier = 1.0;
                negated = false;
                continue;
            }

            since_modifier += 1;
            if since_modifier > MODIFIER_WINDOW {
                multiplier = 1.0;
                negated = false;
            }
        }

        if contributions.is_empty() {
            return 0.0;
        }
        let avg = contributions.iter().sum::<f64>() / contributions.len() as f64;
        avg.clamp(-1.0, 1.0)
    }
}

#[async_trait]
impl PolarityScorer for LexiconScorer {
    async fn score_text(&self, text: &str) -> Result<f64> {
        Ok(self.polarity(text))
    }
}

/// Lowercase word tokens. Apostrophes are dropped so "don't" matches "dont".
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_apostrophes_and_punctuation() {
        assert_eq!(tokenize("Don't STOP, now!"), vec!["dont", "stop", "now"]);
    }

    #[test]
    fn test_positive_and_negative() {
        let scorer = LexiconScorer::default();
        assert!(scorer.polarity("What a great day") > 0.0);
        assert!(scorer.polarity("This is terrible") < 0.0);
    }

    #[test]
    fn test_no_sentiment_words_is_zero() {
        let scorer = LexiconScorer::default();
        assert_eq!(scorer.polarity("the train leaves at nine"), 0.0);
        assert_eq!(scorer.polarity(""), 0.0);
    }

    #[test]
    fn test_negation_flips_and_dampens() {
        let scorer = LexiconScorer::default();
        // good = 0.7, negated = -0.35
        assert!((scorer.polarity("not good") + 0.35).abs() < 1e-10);
    }

    #[test]
    fn test_negation_reaches_across_a_short_gap() {
        let scorer = LexiconScorer::default();
        assert!(scorer.polarity("this is not a good idea") < 0.0);
    }

    #[test]
    fn test_intensifier_scales() {
        let scorer = LexiconScorer::default();
        // good = 0.7 * 1.3 = 0.91
        assert!((scorer.polarity("very good") - 0.91).abs() < 1e-10);
    }

    #[test]
    fn test_score_is_clamped() {
        let scorer = LexiconScorer::default();
        let score = scorer.polarity("absolutely extremely perfect");
        assert!((score - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_deterministic() {
        let scorer = LexiconScorer::default();
        let text = "Really love this, but the ending was awful";
        assert_eq!(scorer.polarity(text), scorer.polarity(text));
    }

    #[test]
    fn test_with_entries_overrides() {
        let scorer = LexiconScorer::default()
            .with_entries(HashMap::from([("Based".to_string(), 0.6)]))
            .unwrap();
        assert!((scorer.polarity("based") - 0.6).abs() < 1e-10);
    }

    #[test]
    fn test_with_entries_rejects_out_of_range() {
        let result =
            LexiconScorer::default().with_entries(HashMap::from([("wow".to_string(), 3.0)]));
        assert!(result.is_err());
    }
}
