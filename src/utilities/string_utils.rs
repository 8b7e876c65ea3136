//! Keyword matching helpers shared by the classifier, skill triggers and
//! action extractor.
//!
//! All matching is case-insensitive substring matching. Keyword tables are
//! stored lowercase; CJK keywords are unaffected by case folding.

/// Count how many distinct keywords from `keywords` occur in `text`.
///
/// Each keyword counts at most once regardless of how often it repeats.
pub fn count_keyword_hits(text: &str, keywords: &[&str]) -> usize {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| lowered.contains(&k.to_lowercase()))
        .count()
}

/// Whether any keyword occurs in `text`.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|k| lowered.contains(&k.to_lowercase()))
}

/// Length in characters (not bytes), so CJK text is measured fairly.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}
