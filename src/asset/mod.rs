//! Image assets bound to a generated website.
//!
//! ```text
//! form data ──► discover ──► fetch ──┐
//! uploads ───────────────────────────┴──► variants ──► preview / packaged HTML
//! ```

mod discover;
mod fetch;
mod variants;

pub use discover::{ImageHeuristic, find_image_urls};
pub use fetch::{FetchedImage, HttpImageSource, ImageSource, collect_assets, download_remote_image};
pub use variants::{
    HtmlVariants, VariantBuilder, VariantError, VariantOutput, check_disjoint, inject_base_tag,
};

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Directory inside the archive that holds asset files.
pub const ARCHIVE_ASSET_DIR: &str = "assets";

/// One image file associated with a generated website.
///
/// Same shape as the upload endpoint's response, so uploaded assets can be
/// passed through a generation request unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Absolute URL (remote origin or this server's `/uploads/...`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Server-relative URL, e.g. `/uploads/1700000000-<uuid>.png`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_url: Option<String>,

    /// Local file holding the bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    /// Name used inside the archive.
    #[serde(default, alias = "originalName")]
    pub filename: String,

    #[serde(default)]
    pub mime: String,

    #[serde(default)]
    pub size: u64,
}

impl Asset {
    /// Strings that may appear verbatim in generated HTML for this asset.
    ///
    /// Non-empty, de-duplicated, longest first: a storage path ending in the
    /// relative URL must be replaced before the relative URL is.
    pub fn candidates(&self) -> Vec<String> {
        let storage = self
            .storage_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let mut out: Vec<String> = Vec::with_capacity(3);
        for candidate in [self.url.clone(), self.relative_url.clone(), storage]
            .into_iter()
            .flatten()
        {
            if !candidate.is_empty() && !out.contains(&candidate) {
                out.push(candidate);
            }
        }
        out.sort_by_key(|c| std::cmp::Reverse(c.len()));
        out
    }

    /// File name inside `assets/`, never containing a path separator.
    pub fn archive_name(&self) -> String {
        let from_filename = base_name(&self.filename);
        if !from_filename.is_empty() {
            return from_filename;
        }
        self.storage_path
            .as_deref()
            .map(|p| base_name(&p.to_string_lossy()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "asset".to_string())
    }

    /// Relative path used by the packaged HTML and the archive.
    pub fn packaged_path(&self) -> String {
        format!("{ARCHIVE_ASSET_DIR}/{}", self.archive_name())
    }

    /// MIME type, falling back to the storage path's extension.
    pub fn effective_mime(&self) -> &str {
        if !self.mime.is_empty() {
            return &self.mime;
        }
        self.storage_path
            .as_deref()
            .map_or(crate::utils::mime::types::OCTET_STREAM, crate::utils::mime::from_path)
    }

    /// Whether the asset can be copied into an archive.
    pub fn is_storable(&self) -> bool {
        self.storage_path.is_some() && !base_name(&self.filename).is_empty()
    }

    /// Local file, when it still exists.
    pub fn existing_file(&self) -> Option<&Path> {
        self.storage_path.as_deref().filter(|p| p.is_file())
    }
}

/// Last path component of a `/` or `\` separated name.
fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Rename assets so that every archive name is unique.
///
/// Later duplicates get `-2`, `-3`, ... before the extension; the first
/// occurrence keeps its name.
pub fn assign_unique_names(assets: &mut [Asset]) {
    let mut taken: FxHashSet<String> = FxHashSet::default();

    for asset in assets.iter_mut() {
        let name = asset.archive_name();
        if taken.insert(name.to_ascii_lowercase()) {
            asset.filename = name;
            continue;
        }

        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
            _ => (name.as_str(), ""),
        };
        let unique = (2..)
            .map(|n| format!("{stem}-{n}{ext}"))
            .find(|candidate| !taken.contains(&candidate.to_ascii_lowercase()))
            .unwrap_or_else(|| name.clone());
        taken.insert(unique.to_ascii_lowercase());
        asset.filename = unique;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded(name: &str) -> Asset {
        Asset {
            url: Some(format!("http://localhost:5000/uploads/{name}")),
            relative_url: Some(format!("/uploads/{name}")),
            storage_path: Some(PathBuf::from(format!("/srv/app/uploads/{name}"))),
            filename: name.to_string(),
            mime: "image/png".into(),
            size: 3,
        }
    }

    #[test]
    fn test_candidates_longest_first() {
        let asset = uploaded("a.png");
        let candidates = asset.candidates();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0], "http://localhost:5000/uploads/a.png");
        assert_eq!(candidates[2], "/uploads/a.png");
    }

    #[test]
    fn test_candidates_skip_empty_and_duplicates() {
        let asset = Asset {
            url: Some(String::new()),
            relative_url: Some("/uploads/a.png".into()),
            storage_path: None,
            filename: "a.png".into(),
            ..Asset::default()
        };
        assert_eq!(asset.candidates(), vec!["/uploads/a.png".to_string()]);
    }

    #[test]
    fn test_archive_name_strips_directories() {
        let mut asset = uploaded("a.png");
        asset.filename = "../../etc/passwd".into();
        assert_eq!(asset.archive_name(), "passwd");

        asset.filename = String::new();
        assert_eq!(asset.archive_name(), "a.png");
        assert_eq!(asset.packaged_path(), "assets/a.png");
    }

    #[test]
    fn test_assign_unique_names() {
        let mut assets = vec![uploaded("photo.jpg"), uploaded("photo.jpg"), uploaded("PHOTO.jpg")];
        assets[1].storage_path = Some(PathBuf::from("/srv/app/uploads/other.jpg"));
        assign_unique_names(&mut assets);
        assert_eq!(assets[0].filename, "photo.jpg");
        assert_eq!(assets[1].filename, "photo-2.jpg");
        assert_eq!(assets[2].filename, "PHOTO-3.jpg");
    }

    #[test]
    fn test_deserialize_upload_shape() {
        let json = r#"{
            "url": "http://localhost:5000/uploads/x.png",
            "relativeUrl": "/uploads/x.png",
            "originalName": "me.png",
            "mime": "image/png",
            "size": 10,
            "storagePath": "/srv/uploads/x.png"
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.filename, "me.png");
        assert_eq!(asset.relative_url.as_deref(), Some("/uploads/x.png"));
        assert!(asset.is_storable());
    }

    #[test]
    fn test_effective_mime_fallback() {
        let asset = Asset {
            storage_path: Some(PathBuf::from("/x/logo.svg")),
            filename: "logo.svg".into(),
            ..Asset::default()
        };
        assert_eq!(asset.effective_mime(), "image/svg+xml");
    }
}
