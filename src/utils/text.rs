/// Maximum number of characters of a response body kept in a result
pub const SNIPPET_LEN: usize = 200;

/// Truncate `text` to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Response body snippet as stored in a failed result
pub fn snippet(body: &str) -> String {
    truncate_chars(body, SNIPPET_LEN)
}
