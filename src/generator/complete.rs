//! Structural completeness check for generated documents.

use std::sync::LazyLock;

use regex::Regex;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:html|css|javascript)?").unwrap());

/// Markers that must all be present.
const REQUIRED: [&str; 5] = ["<!DOCTYPE html>", "<html", "</html>", "<body", "</body>"];

/// Acceptable endings of the trimmed document.
const ENDINGS: [&str; 3] = ["</html>", "</body>", "</script>"];

/// Whether `code` looks like a finished HTML document.
pub fn is_code_complete(code: &str) -> bool {
    let trimmed = code.trim();
    REQUIRED.iter().all(|marker| code.contains(marker))
        && ENDINGS.iter().any(|end| trimmed.ends_with(end))
}

/// Remove markdown code fence markers and surrounding whitespace.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>";

    #[test]
    fn test_complete_document() {
        assert!(is_code_complete(COMPLETE));
        assert!(is_code_complete(&format!("\n  {COMPLETE}\n\n")));
    }

    #[test]
    fn test_each_marker_required() {
        for marker in REQUIRED {
            let broken = COMPLETE.replacen(marker, "", 1);
            assert!(!is_code_complete(&broken), "missing {marker}");
        }
    }

    #[test]
    fn test_endings() {
        let script_end = "<!DOCTYPE html><html><body></body></html>\n<script>x()</script>";
        assert!(is_code_complete(script_end));
        let trailing_text = format!("{COMPLETE}\nThat's the site!");
        assert!(!is_code_complete(&trailing_text));
    }

    #[test]
    fn test_strip_code_fences() {
        let raw = "```html\n<!DOCTYPE html>\n<html></html>\n```";
        assert_eq!(strip_code_fences(raw), "<!DOCTYPE html>\n<html></html>");
        assert_eq!(strip_code_fences("```css\na{}\n```javascript\nb()\n```"), "a{}\n\nb()");
    }
}
