//! URL to upload file resolution.

use std::path::{Path, PathBuf};

/// Resolve the part of a URL after `/uploads/` to a file inside `upload_dir`.
pub fn resolve_upload(url: &str, upload_dir: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.is_empty() || clean.contains("..") {
        return None;
    }

    let local = upload_dir.join(&clean);

    // Canonicalize so symlinks cannot escape the upload directory
    let canonical = local.canonicalize().ok()?;
    let root_canonical = upload_dir.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    canonical.is_file().then_some(canonical)
}

/// Decode, strip query string, trim slashes.
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let path = url.split('?').next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn uploads() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("uploads");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a b.png"), b"png").unwrap();
        fs::write(temp.path().join("secret.txt"), b"secret").unwrap();
        (temp, dir)
    }

    #[test]
    fn test_resolves_encoded_name() {
        let (_temp, dir) = uploads();
        let path = resolve_upload("a%20b.png?v=2", &dir).unwrap();
        assert!(path.ends_with("a b.png"));
    }

    #[test]
    fn test_rejects_traversal() {
        let (_temp, dir) = uploads();
        assert!(resolve_upload("../secret.txt", &dir).is_none());
        assert!(resolve_upload("%2e%2e/secret.txt", &dir).is_none());
    }

    #[test]
    fn test_rejects_missing_and_directories() {
        let (_temp, dir) = uploads();
        assert!(resolve_upload("nope.png", &dir).is_none());
        assert!(resolve_upload("", &dir).is_none());
    }
}
