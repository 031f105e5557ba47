//! Text cleanup for titles, prices and descriptions.

/// Longest description kept, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize`], restricted to ASCII word characters and basic punctuation,
/// capped at [`MAX_DESCRIPTION_CHARS`].
pub fn normalize_description(raw: &str) -> String {
    let kept: String = raw.chars().filter(|c| is_description_char(*c)).collect();
    let collapsed = normalize(&kept);
    let truncated: String = collapsed.chars().take(MAX_DESCRIPTION_CHARS).collect();
    truncated.trim_end().to_string()
}

fn is_description_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(
            c,
            '.' | ',' | '!' | '?' | '-' | '@' | '#' | '$' | '%' | '&' | '*' | '(' | ')'
        )
}

/// Remove every occurrence of the given phrases, then normalize.
pub fn strip_phrases(raw: &str, phrases: &[&str]) -> String {
    let stripped = phrases
        .iter()
        .fold(raw.to_string(), |text, phrase| text.replace(phrase, " "));
    normalize(&stripped)
}

/// First `max` characters of `raw`.
pub fn truncate_chars(raw: &str, max: usize) -> &str {
    match raw.char_indices().nth(max) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}
