// Output formatting: terminal display and report generation.

pub mod markdown;
pub mod terminal;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Respects UTF-8 character boundaries, so multi-byte phrases (emoji,
/// accented letters) never panic.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// Label for a flagged phrase. The default cleaning rule can reduce a post
/// of pure punctuation to an empty key; show that explicitly.
pub fn phrase_label(phrase: &str, max_chars: usize) -> String {
    if phrase.is_empty() {
        "(empty after cleaning)".to_string()
    } else {
        truncate_chars(phrase, max_chars)
    }
}

/// Join a cluster's members for display, listing at most `max_members`.
pub fn cluster_preview<'a>(
    members: impl IntoIterator<Item = &'a String>,
    total: usize,
    max_members: usize,
) -> String {
    let shown: Vec<&str> = members
        .into_iter()
        .take(max_members)
        .map(String::as_str)
        .collect();
    if total > shown.len() {
        format!("{}, ... (+{} more)", shown.join(", "), total - shown.len())
    } else {
        shown.join(", ")
    }
}
