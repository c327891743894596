//! Small text helpers for SEO metadata.

/// Clip a description to at most `max_chars` characters, preferring a word
/// boundary and ending with an ellipsis when truncated.
pub fn truncate_description(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    let head = match cut.rfind(' ') {
        // Only back up to a space if it doesn't cost more than half the text.
        Some(idx) if idx > max_chars / 2 => &cut[..idx],
        _ => cut.as_str(),
    };

    format!("{}\u{2026}", head.trim_end())
}
