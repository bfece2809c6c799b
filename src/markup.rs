//! Plain-text views of rich-text note content.
//!
//! Stripping is a regex pass over `<...>` spans, not a parser. Malformed or
//! nested-looking markup may leave fragments behind.

use once_cell::sync::Lazy;
use regex::Regex;

pub const PREVIEW_LENGTH: usize = 150;

static MARKUP_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));

pub fn strip_markup(content: &str) -> String {
    MARKUP_SPAN.replace_all(content, "").into_owned()
}

/// True when the content still has text once markup and whitespace are gone.
pub fn has_text(content: &str) -> bool {
    !strip_markup(content).trim().is_empty()
}

/// Card preview of at most `max_chars` characters of plain text.
///
/// Short content comes back unchanged, markup included.
pub fn preview(content: &str, max_chars: usize) -> String {
    let text = strip_markup(content);
    if text.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
