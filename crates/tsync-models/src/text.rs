//! Text helpers shared by the normalizer and write-back.

/// Truncate to at most `max_chars` characters, never splitting a code point.
///
/// Google Sheets limits cells by character count, so this counts `char`s
/// rather than bytes.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
