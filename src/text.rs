//! Character-safe text helpers shared by search previews, QA context
//! windows, and the in-memory keyword scorer.

/// Lower-cased alphanumeric words of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Characters `[start, end)` of `text`, clamped to its length.
pub fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Character index of the earliest case-insensitive occurrence of any of
/// `terms` in `text`.
pub fn first_match(text: &str, terms: &[String]) -> Option<usize> {
    let chars: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
    // Lower-casing can change length for a few scripts; fall back to the
    // original characters in that case so indices stay aligned with `text`.
    let chars = if chars.len() == text.chars().count() {
        chars
    } else {
        text.chars().collect()
    };

    terms
        .iter()
        .filter(|t| !t.is_empty())
        .filter_map(|term| {
            let needle: Vec<char> = term.chars().collect();
            chars
                .windows(needle.len())
                .position(|window| window == needle.as_slice())
        })
        .min()
}
