// Text normalization for phrase counting.
//
// A post is lowercased, stripped by the cleaning rule, then trimmed. With
// the default rule "Hello!!" and "hello" land on the same key.

use anyhow::{Context, Result};
use regex::Regex;

/// Strip everything except ASCII letters, digits and whitespace. `\s` is
/// Unicode-aware, so non-breaking and other Unicode spaces are kept.
pub const DEFAULT_CLEANING_PATTERN: &str = r"[^a-zA-Z0-9\s]";

/// A compiled cleaning rule. Every match of the pattern is removed.
#[derive(Debug, Clone)]
pub struct CleaningRule {
    pattern: Regex,
}

impl CleaningRule {
    /// Compile a custom cleaning pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid cleaning pattern: {pattern}"))?;
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Lowercase, clean and trim a post into its counting key.
    pub fn normalize(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        self.pattern.replace_all(&lower, "").trim().to_string()
    }
}

impl Default for CleaningRule {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_CLEANING_PATTERN).expect("default cleaning pattern compiles"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let rule = CleaningRule::default();
        assert_eq!(rule.normalize("Hello!!"), "hello");
        assert_eq!(rule.normalize("hello"), "hello");
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        let rule = CleaningRule::default();
        assert_eq!(
            rule.normalize("  Buy NOW: 50% off!!  "),
            "buy now 50 off"
        );
    }

    #[test]
    fn test_unicode_whitespace_is_kept() {
        let rule = CleaningRule::default();
        assert_eq!(rule.normalize("hello\u{a0}world"), "hello\u{a0}world");
        assert_eq!(rule.normalize("buy\u{2003}now!"), "buy\u{2003}now");
        assert_ne!(rule.normalize("hello\u{a0}world"), rule.normalize("helloworld"));
        // Leading and trailing Unicode whitespace is still trimmed
        assert_eq!(rule.normalize("\u{a0}spam\u{3000}"), "spam");
    }

    #[test]
    fn test_all_punctuation_becomes_empty_key() {
        let rule = CleaningRule::default();
        assert_eq!(rule.normalize("?!?!"), "");
    }

    #[test]
    fn test_custom_pattern() {
        // Keep hashtags
        let rule = CleaningRule::new(r"[^a-z0-9#\s]").unwrap();
        assert_eq!(rule.normalize("Follow #Back!"), "follow #back");
        assert_eq!(rule.as_str(), r"[^a-z0-9#\s]");
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(CleaningRule::new("[unclosed").is_err());
    }
}
