// Character-safe slicing helpers.
//
// Windows in this crate are measured in characters, not bytes, so that
// accented Portuguese text never splits a code point.

/// Byte offset reached after moving `n` characters forward from `from`.
pub fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Byte offset reached after moving `n` characters back from `from`.
pub fn retreat_chars(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[..from]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// `start..end` widened by `radius` characters on each side, clipped to the text.
pub fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    &text[retreat_chars(text, start, radius)..advance_chars(text, end, radius)]
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// At most `max` leading characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    &s[..advance_chars(s, 0, max)]
}
