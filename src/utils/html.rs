//! HTML utility functions.
//!
//! - `escape()` - HTML entity escaping
//! - `find_open_tag()` - locate an opening tag by name, case-insensitively

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

// =============================================================================
// Tag Lookup
// =============================================================================

/// Span of an opening tag: `start` is the byte index of `<`, `end` is one past `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpan {
    pub start: usize,
    pub end: usize,
}

/// Find the first opening tag `<name ...>` (ASCII case-insensitive).
///
/// The tag name must be followed by `>`, `/` or whitespace, so `head`
/// does not match `<header>`. Returns `None` when the tag is absent or
/// never closed with `>`.
pub fn find_open_tag(html: &str, name: &str) -> Option<TagSpan> {
    let bytes = html.as_bytes();
    let needle_len = name.len() + 1;
    let mut from = 0;

    while from + needle_len <= bytes.len() {
        let rel = bytes[from..].iter().position(|&b| b == b'<')?;
        let start = from + rel;
        let name_end = start + needle_len;

        if name_end <= bytes.len()
            && bytes[start + 1..name_end].eq_ignore_ascii_case(name.as_bytes())
            && bytes
                .get(name_end)
                .is_some_and(|&b| b == b'>' || b == b'/' || b.is_ascii_whitespace())
        {
            let close = bytes[name_end..].iter().position(|&b| b == b'>')?;
            return Some(TagSpan {
                start,
                end: name_end + close + 1,
            });
        }

        from = start + 1;
    }

    None
}
