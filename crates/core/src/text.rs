//! Display helpers for product cards.

/// Keep the first `max_words` space-separated words of `text`.
///
/// Text that already fits is returned unchanged; otherwise the kept words
/// are followed by `...`.
#[must_use]
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split(' ').collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    let mut truncated = words
        .into_iter()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");
    truncated.push_str("...");
    truncated
}

/// Upper-case the first character, leaving the rest as is.
#[must_use]
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
