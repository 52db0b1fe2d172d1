//! Log sanitizer — content-free representations for audit sinks
//!
//! Once any marking is detected, no substring of the content leaves this
//! module, whatever the level. Only the canonical name and the length do.

use crate::types::Verdict;

/// Default preview length for unclassified content, in characters
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

const ELLIPSIS: &str = "...";

/// Safe-to-log representation of `content`
pub fn sanitize_for_log(content: &str, verdict: &Verdict) -> String {
    sanitize_for_log_with(content, verdict, DEFAULT_PREVIEW_CHARS)
}

/// Safe-to-log representation with an explicit preview length
pub fn sanitize_for_log_with(content: &str, verdict: &Verdict, preview_chars: usize) -> String {
    if verdict.detected {
        return format!(
            "[{} len={}]",
            verdict.canonical_text,
            content.chars().count()
        );
    }

    preview(content, preview_chars)
}

/// First `max_chars` characters, with an ellipsis when truncated
fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &content[..cut], ELLIPSIS),
        None => content.to_string(),
    }
}
