//! Outbound text helpers.

/// Marker appended to truncated messages.
pub const ELLIPSIS: &str = "\n…";

/// Cuts `text` to `max_chars` characters and appends [`ELLIPSIS`] when it was longer.
///
/// Counts Unicode scalar values, never splitting a character.
///
/// # Example
/// ```
/// use hostwatch::notify::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello", 2), "he\n…");
/// ```
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    }
}

/// Escapes the characters that are markup in HTML parse mode.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
