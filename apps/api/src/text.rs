//! Small string helpers shared by extraction, prompting and projection code.

/// Returns the longest prefix of `s` holding at most `max_chars` characters.
/// Never splits a multi-byte character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Character count (not byte length) of `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Normalises line endings to `\n`, drops control characters other than
/// newline and tab, and trims. Output is safe for Postgres TEXT columns.
pub fn clean_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .chars()
        .map(|c| if c == '\r' { '\n' } else { c })
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}
