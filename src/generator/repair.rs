//! Ordered repair rules for incomplete documents.
//!
//! Each rule is a pure `fn(&str) -> String` that fixes one structural gap
//! and leaves the text alone otherwise. Rules run in order and completeness
//! is checked after each one; if the last rule still leaves the document
//! incomplete, [`FALLBACK_HTML`] is used instead.

use super::complete::{is_code_complete, strip_code_fences};
use crate::utils::html::find_open_tag;

const DOCTYPE: &str = "<!DOCTYPE html>";

const HEAD_BLOCK: &str = "
<head>
<meta charset=\"UTF-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
<title>Generated Website</title>
</head>";

/// Served when no rule can make the generated document complete.
pub const FALLBACK_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Website</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: Arial, sans-serif; line-height: 1.6; padding: 20px; }
        .container { max-width: 1200px; margin: 0 auto; }
        header { text-align: center; padding: 2rem 0; }
        section { margin: 2rem 0; padding: 2rem; background: #f5f5f5; border-radius: 8px; }
        h1 { color: #333; margin-bottom: 1rem; }
        p { color: #666; }
    </style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Generated Website</h1>
            <p>This is a fallback page. The generated document was incomplete.</p>
        </header>
        <section id="about">
            <h2>About</h2>
            <p>An introduction would appear here.</p>
        </section>
        <section id="content">
            <h2>Content</h2>
            <p>The main content would appear here.</p>
        </section>
        <section id="contact">
            <h2>Contact</h2>
            <p>Contact information would appear here.</p>
        </section>
    </div>
    <script>
        console.log('Fallback website loaded');
    </script>
</body>
</html>"#;

/// A named repair step.
#[derive(Clone, Copy)]
pub struct RepairRule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

impl std::fmt::Debug for RepairRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Repair pipeline, in application order.
pub const RULES: [RepairRule; 10] = [
    RepairRule { name: "strip_leading_prose", apply: strip_leading_prose },
    RepairRule { name: "strip_trailing_prose", apply: strip_trailing_prose },
    RepairRule { name: "wrap_fragment", apply: wrap_fragment },
    RepairRule { name: "ensure_doctype", apply: ensure_doctype },
    RepairRule { name: "ensure_html_open", apply: ensure_html_open },
    RepairRule { name: "ensure_head", apply: ensure_head },
    RepairRule { name: "ensure_body_open", apply: ensure_body_open },
    RepairRule { name: "drop_dangling_tag", apply: drop_dangling_tag },
    RepairRule { name: "close_body", apply: close_body },
    RepairRule { name: "close_html", apply: close_html },
];

/// Final document and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub html: String,
    /// Names of the rules that changed the text.
    pub applied: Vec<&'static str>,
    pub fallback: bool,
}

impl Finalized {
    pub fn was_repaired(&self) -> bool {
        self.fallback || !self.applied.is_empty()
    }
}

/// Strip code fences, then repair until complete or fall back.
pub fn finalize_code(raw: &str) -> Finalized {
    repair(&strip_code_fences(raw))
}

/// Run [`RULES`] in order until the document is complete.
pub fn repair(code: &str) -> Finalized {
    let mut html = code.trim().to_string();
    let mut applied = Vec::new();

    if is_code_complete(&html) {
        return Finalized { html, applied, fallback: false };
    }

    for rule in RULES {
        let next = (rule.apply)(&html);
        if next != html {
            applied.push(rule.name);
            html = next;
        }
        if is_code_complete(&html) {
            return Finalized { html, applied, fallback: false };
        }
    }

    Finalized {
        html: FALLBACK_HTML.to_string(),
        applied,
        fallback: true,
    }
}

// ============================================================================
// rules
// ============================================================================

/// ASCII case-insensitive find.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

fn rfind_ci(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .rposition(|w| w.eq_ignore_ascii_case(needle))
}

/// Whether `at` falls inside an unclosed `<script>` or `<style>` block.
fn in_raw_text(code: &str, at: usize) -> bool {
    let before = &code[..at];
    ["script", "style"].iter().any(|tag| {
        let open = rfind_ci(before, &format!("<{tag}"));
        let close = rfind_ci(before, &format!("</{tag}"));
        open > close
    })
}

/// Offset of the `</html>` that ends the document, ignoring any inside scripts.
fn document_close(code: &str) -> Option<usize> {
    let needle = "</html>".as_bytes();
    code.as_bytes()
        .windows(needle.len())
        .enumerate()
        .rev()
        .filter(|(_, w)| w.eq_ignore_ascii_case(needle))
        .map(|(at, _)| at)
        .find(|&at| !in_raw_text(code, at))
}

fn insert_at(text: &str, at: usize, insert: &str) -> String {
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..at]);
    out.push_str(insert);
    out.push_str(&text[at..]);
    out
}

/// Drop chatter before the doctype or `<html>` tag.
pub fn strip_leading_prose(code: &str) -> String {
    let start = [find_ci(code, "<!doctype"), find_open_tag(code, "html").map(|s| s.start)]
        .into_iter()
        .flatten()
        .min();
    match start {
        Some(at) if at > 0 => code[at..].to_string(),
        _ => code.to_string(),
    }
}

/// Drop chatter after the final `</html>`.
pub fn strip_trailing_prose(code: &str) -> String {
    match document_close(code) {
        Some(at) => code[..at + "</html>".len()].to_string(),
        None => code.to_string(),
    }
}

/// Wrap markup with no document structure at all in a minimal page.
pub fn wrap_fragment(code: &str) -> String {
    if find_ci(code, "<!doctype").is_some() || find_open_tag(code, "html").is_some() {
        return code.to_string();
    }
    format!(
        r#"{DOCTYPE}
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Generated Website</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{ font-family: Arial, sans-serif; line-height: 1.6; }}
    </style>
</head>
<body>
{code}
</body>
</html>"#
    )
}

/// Normalize or prepend `<!DOCTYPE html>`.
pub fn ensure_doctype(code: &str) -> String {
    if code.contains(DOCTYPE) {
        return code.to_string();
    }
    match find_ci(code, "<!doctype html>") {
        Some(at) => format!("{}{DOCTYPE}{}", &code[..at], &code[at + DOCTYPE.len()..]),
        None => format!("{DOCTYPE}\n{code}"),
    }
}

/// Insert `<html lang="en">` right after the doctype.
pub fn ensure_html_open(code: &str) -> String {
    if code.contains("<html") {
        return code.to_string();
    }
    match code.find(DOCTYPE) {
        Some(at) => insert_at(code, at + DOCTYPE.len(), "\n<html lang=\"en\">"),
        None => format!("<html lang=\"en\">\n{code}"),
    }
}

/// Insert a minimal `<head>` after the opening `<html>` tag.
pub fn ensure_head(code: &str) -> String {
    if find_open_tag(code, "head").is_some() {
        return code.to_string();
    }
    match find_open_tag(code, "html") {
        Some(span) => insert_at(code, span.end, HEAD_BLOCK),
        None => code.to_string(),
    }
}

/// Open `<body>` after the head.
pub fn ensure_body_open(code: &str) -> String {
    if code.contains("<body") {
        return code.to_string();
    }
    if let Some(at) = find_ci(code, "</head>") {
        return insert_at(code, at + "</head>".len(), "\n<body>");
    }
    match find_open_tag(code, "head") {
        Some(span) => insert_at(code, span.end, "\n</head>\n<body>"),
        None => code.to_string(),
    }
}

/// Cut a tag truncated mid-way (`<div cla`) at the end of the text.
pub fn drop_dangling_tag(code: &str) -> String {
    let open = code.rfind('<');
    let close = code.rfind('>');
    match (open, close) {
        (Some(o), Some(c)) if o > c => code[..o].trim_end().to_string(),
        (Some(o), None) => code[..o].trim_end().to_string(),
        _ => code.to_string(),
    }
}

/// Close `<body>` before `</html>`, or at the end.
pub fn close_body(code: &str) -> String {
    if code.contains("</body>") {
        return code.to_string();
    }
    match document_close(code) {
        Some(at) => insert_at(code, at, "</body>\n"),
        None => format!("{}\n</body>", code.trim_end()),
    }
}

/// Append `</html>`.
pub fn close_html(code: &str) -> String {
    if document_close(code).is_some() {
        return code.to_string();
    }
    format!("{}\n</html>", code.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>x</title></head>\n<body>\n<h1>Hi</h1>\n</body>\n</html>";

    #[test]
    fn test_complete_untouched() {
        let out = repair(PAGE);
        assert_eq!(out.html, PAGE);
        assert!(!out.was_repaired());
    }

    #[test]
    fn test_missing_html_close() {
        let truncated = PAGE.trim_end_matches("</html>");
        let out = repair(truncated);
        assert!(is_code_complete(&out.html));
        assert_eq!(out.applied, vec!["close_html"]);
        assert!(out.html.starts_with(truncated.trim_end()));
    }

    #[test]
    fn test_truncated_mid_tag() {
        let out = repair("<!DOCTYPE html><html><head></head><body><section><p>Hello</p><div cla");
        assert!(is_code_complete(&out.html));
        assert!(!out.html.contains("<div cla"));
        assert!(out.html.ends_with("</body>\n</html>"));
        assert_eq!(out.applied, vec!["drop_dangling_tag", "close_body", "close_html"]);
    }

    #[test]
    fn test_prose_around_document() {
        let raw = format!("Here is your website:\n{PAGE}\nEnjoy!");
        let out = repair(&raw);
        assert_eq!(out.html, PAGE);
        assert_eq!(out.applied, vec!["strip_leading_prose", "strip_trailing_prose"]);
    }

    #[test]
    fn test_html_close_inside_script_is_not_document_end() {
        let truncated = "<!DOCTYPE html><html><head></head><body><p>Hi</p>\
            <script>document.write(\"</html>\");</script><p>More content";
        let out = repair(truncated);
        assert!(!out.fallback);
        assert!(out.html.contains("<p>More content"));
        assert!(out.html.ends_with("<p>More content\n</body>"));
        assert_eq!(out.applied, vec!["close_body"]);
        assert_eq!(close_html(truncated), format!("{truncated}\n</html>"));

        let page = "<html><body><script>w(\"</html>\")</script></body></html>\nThanks!";
        assert_eq!(
            strip_trailing_prose(page),
            "<html><body><script>w(\"</html>\")</script></body></html>"
        );
    }

    #[test]
    fn test_fragment_wrapped() {
        let out = repair("<h1>Jane</h1><p>Designer</p>");
        assert!(is_code_complete(&out.html));
        assert!(out.html.contains("<h1>Jane</h1>"));
        assert_eq!(out.applied, vec!["wrap_fragment"]);
    }

    #[test]
    fn test_missing_scaffolding() {
        let out = repair("<html><h1>Hi</h1>");
        assert!(is_code_complete(&out.html), "{}", out.html);
        let html = &out.html;
        assert!(html.starts_with(DOCTYPE));
        let head = html.find("<head>").unwrap();
        let body = html.find("<body>").unwrap();
        let h1 = html.find("<h1>").unwrap();
        assert!(head < body && body < h1);
    }

    #[test]
    fn test_lowercase_doctype_normalized() {
        assert_eq!(
            ensure_doctype("<!doctype html><html>"),
            "<!DOCTYPE html><html>"
        );
        assert_eq!(ensure_doctype("<html>"), "<!DOCTYPE html>\n<html>");
    }

    #[test]
    fn test_ensure_head_respects_header_tag() {
        let out = ensure_head("<!DOCTYPE html><html><header>x</header>");
        assert!(out.contains("<html>\n<head>"));
    }

    #[test]
    fn test_body_open_without_head_close() {
        let out = ensure_body_open("<html><head><title>x</title><h1>y</h1>");
        assert!(out.starts_with("<html><head>\n</head>\n<body>"));
    }

    #[test]
    fn test_close_body_before_html() {
        assert_eq!(close_body("<body>x</html>"), "<body>x</body>\n</html>");
        assert_eq!(close_body("<body>x"), "<body>x\n</body>");
    }

    #[test]
    fn test_fallback_when_unrepairable() {
        let out = repair("<!DOCTYPE html><html");
        assert!(out.fallback);
        assert_eq!(out.html, FALLBACK_HTML);
        assert!(is_code_complete(FALLBACK_HTML));
    }

    #[test]
    fn test_finalize_strips_fences() {
        let raw = format!("```html\n{PAGE}\n```");
        let out = finalize_code(&raw);
        assert_eq!(out.html, PAGE);
        assert!(!out.was_repaired());
    }
}
