//! `[assets]` section configuration.
//!
//! Where image assets live and how form values are recognized as images.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! upload_dir = "uploads"          # Relative to the config file, `~` expanded
//! fetch_timeout_secs = 15
//! image_keywords = ["image", "logo", "photo"]
//! image_extensions = [".jpg", ".png", ".webp"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Form keys whose values are treated as images when they hold a URL.
pub const DEFAULT_IMAGE_KEYWORDS: [&str; 10] = [
    "image",
    "logo",
    "photo",
    "avatar",
    "banner",
    "hero",
    "thumbnail",
    "cover",
    "profile",
    "picture",
];

/// URL path suffixes that mark a value as an image regardless of its key.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".png", ".gif", ".webp", ".svg", ".bmp"];

/// Asset storage and discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory holding uploaded and downloaded images.
    pub upload_dir: PathBuf,

    /// Timeout for downloading a single remote image.
    pub fetch_timeout_secs: u64,

    /// Key substrings (case-insensitive) that mark an image field.
    pub image_keywords: Vec<String>,

    /// Path suffixes (lowercase, with dot) that mark an image URL.
    pub image_extensions: Vec<String>,
}

impl AssetsConfig {
    pub const FETCH_TIMEOUT: FieldPath = FieldPath::new("assets.fetch_timeout_secs");
    pub const IMAGE_KEYWORDS: FieldPath = FieldPath::new("assets.image_keywords");
    pub const IMAGE_EXTENSIONS: FieldPath = FieldPath::new("assets.image_extensions");

    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.fetch_timeout_secs == 0 {
            diag.error(Self::FETCH_TIMEOUT, "must be at least 1 second");
        }
        if self.image_keywords.iter().all(|k| k.trim().is_empty()) {
            diag.error(Self::IMAGE_KEYWORDS, "at least one keyword is required");
        }
        if self.image_extensions.is_empty() {
            diag.error(Self::IMAGE_EXTENSIONS, "at least one extension is required");
        }
        for ext in &self.image_extensions {
            if !ext.starts_with('.') {
                diag.error_with_hint(
                    Self::IMAGE_EXTENSIONS,
                    format!("`{ext}` must start with a dot"),
                    format!("write it as `.{ext}`"),
                );
            }
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            fetch_timeout_secs: 15,
            image_keywords: DEFAULT_IMAGE_KEYWORDS.iter().map(|s| (*s).to_string()).collect(),
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_assets_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.assets.image_keywords.len(), 10);
        assert!(config.assets.image_extensions.contains(&".webp".to_string()));
        assert_eq!(config.assets.fetch_timeout().as_secs(), 15);
    }

    #[test]
    fn test_assets_validate_extension_dot() {
        let config = test_parse_config("[assets]\nimage_extensions = [\"png\"]");
        let mut diag = ConfigDiagnostics::new();
        config.assets.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert!(diag.errors()[0].message.contains("png"));
    }
}
