/// Cut `s` to at most `max_chars` characters and append `marker` when
/// anything was dropped.
#[must_use]
pub fn truncate_with_marker(s: &str, max_chars: usize, marker: &str) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{marker}", &s[..idx]),
        None => s.to_string(),
    }
}

/// Byte-budget variant for captured process output. Never splits a character.
#[must_use]
pub fn truncate_bytes(s: String, max_bytes: usize, marker: &str) -> String {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut truncated = s;
    truncated.truncate(end);
    truncated.push_str(marker);
    truncated
}
