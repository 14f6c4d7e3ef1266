//! Answer normalization.

/// Canonicalize free text for comparison: trim, collapse internal whitespace
/// runs to a single space, and lower-case.
///
/// Total and idempotent: `normalize(&normalize(t)) == normalize(t)`.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonicalize a single-token option (`"a "` -> `"A"`).
///
/// Letter options and TRUE/FALSE/NOT GIVEN labels are compared upper-cased
/// and trimmed, without collapsing internal whitespace.
pub fn normalize_option(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
