//! MIME type detection utilities.
//!
//! Provides consistent MIME type detection across the codebase.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const MARKDOWN: &str = "text/markdown; charset=utf-8";

    // Binary
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const ZIP: &str = "application/zip";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";
}

/// Image MIME types with the file extension used when storing them.
const IMAGE_EXTENSIONS: [(&str, &str); 6] = [
    (types::JPEG, ".jpg"),
    (types::PNG, ".png"),
    (types::GIF, ".gif"),
    (types::WEBP, ".webp"),
    (types::SVG, ".svg"),
    (types::BMP, ".bmp"),
];

/// Guess MIME type from file extension.
///
/// Returns a full MIME type string suitable for HTTP Content-Type header.
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    from_extension(ext.as_deref())
}

/// Guess MIME type from file extension string (without the dot).
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        Some("json") => types::JSON,
        Some("md") => types::MARKDOWN,
        Some("txt") => types::PLAIN,
        Some("zip") => types::ZIP,

        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("avif") => types::AVIF,
        Some("ico") => types::ICO,
        Some("bmp") => types::BMP,

        _ => types::OCTET_STREAM,
    }
}

/// Strip parameters and normalize case: `"Image/PNG; charset=x"` -> `"image/png"`.
pub fn normalize(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Storage extension (with dot) for a normalized image MIME type.
pub fn image_extension(mime: &str) -> Option<&'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
}

/// Image MIME type for an extension (with dot, lowercase).
pub fn image_mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = if ext == ".jpeg" { ".jpg" } else { ext };
    IMAGE_EXTENSIONS
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(m, _)| *m)
}

/// Check if the MIME type represents an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(&PathBuf::from("index.html")), types::HTML);
        assert_eq!(from_path(&PathBuf::from("logo.PNG")), types::PNG);
        assert_eq!(from_path(&PathBuf::from("photo.jpeg")), types::JPEG);
        assert_eq!(from_path(&PathBuf::from("icon.svg")), types::SVG);
        assert_eq!(from_path(&PathBuf::from("unknown.xyz")), types::OCTET_STREAM);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Image/PNG; charset=binary"), "image/png");
        assert_eq!(normalize("  text/html "), "text/html");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_image_extension_roundtrip() {
        assert_eq!(image_extension("image/jpeg"), Some(".jpg"));
        assert_eq!(image_extension("image/svg+xml"), Some(".svg"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_mime_for_extension(".jpeg"), Some(types::JPEG));
        assert_eq!(image_mime_for_extension(".webp"), Some(types::WEBP));
        assert_eq!(image_mime_for_extension(".pdf"), None);
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(types::PNG));
        assert!(is_image(types::SVG));
        assert!(!is_image(types::HTML));
    }
}
