//! Display helpers: text truncation and relative age.

use chrono::{DateTime, Utc};

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Right-truncate to `max_chars` characters, appending `…` if truncated.
/// Counts chars, not bytes, so multi-byte text never splits.
pub fn truncate_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}

/// Age of `since` relative to `now`: "just now", "3m", "2h", "4d".
pub fn relative_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let s = (now - since).num_seconds().unsigned_abs();
    if s < 60 {
        "just now".to_string()
    } else if s < 3600 {
        format!("{}m", s / 60)
    } else if s < 86400 {
        format!("{}h", s / 3600)
    } else {
        format!("{}d", s / 86400)
    }
}
