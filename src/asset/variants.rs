//! Build the preview and packaged HTML variants.
//!
//! Both variants come from the same raw HTML by literal replacement of each
//! asset's match strings:
//!
//! | Variant  | Replacement                                   |
//! |----------|-----------------------------------------------|
//! | packaged | `assets/<filename>` when the file is on disk  |
//! | preview  | `data:<mime>;base64,...`, else absolute `url` |
//!
//! An asset without a local file keeps its match strings in the packaged
//! HTML, since nothing would land in the archive's `assets/` directory.
//!
//! The preview also gets a `<base href>` after the first `<head>` tag so any
//! remaining relative paths resolve against the server.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use rustc_hash::FxHashSet;
use thiserror::Error;

use super::{Asset, assign_unique_names};
use crate::debug;
use crate::utils::html::{escape, find_open_tag};
use crate::utils::mime;

/// Server-relative upload paths left in generated HTML.
static UPLOAD_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/uploads/[A-Za-z0-9._-]+").unwrap());

/// Transient pair computed per generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlVariants {
    pub preview_html: String,
    pub packaged_html: String,
}

/// Variants plus the final asset list (implicit uploads appended, names unique).
#[derive(Debug, Clone)]
pub struct VariantOutput {
    pub variants: HtmlVariants,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Error)]
pub enum VariantError {
    /// Two different assets share a match string, or one contains the other.
    #[error("asset match strings overlap: `{first}` and `{second}`")]
    OverlappingCandidates { first: String, second: String },
}

/// Builds [`HtmlVariants`] for one request.
#[derive(Debug, Clone, Default)]
pub struct VariantBuilder {
    base_url: Option<String>,
    upload_dir: Option<PathBuf>,
}

impl VariantBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Origin injected as `<base href>` into the preview.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = (!base_url.trim().is_empty()).then_some(base_url);
        self
    }

    /// Directory searched for undeclared `/uploads/<name>` references.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    pub fn build(&self, raw_html: &str, assets: Vec<Asset>) -> Result<VariantOutput, VariantError> {
        let mut assets = dedup(assets);
        check_disjoint(&assets)?;

        if let Some(dir) = &self.upload_dir {
            let implicit = implicit_uploads(raw_html, dir, &assets);
            assets.extend(implicit);
        }
        assign_unique_names(&mut assets);

        let patterns = match_patterns(&assets);

        let packaged: Vec<Option<String>> = assets.iter().map(packaged_reference).collect();
        let packaged_html = replace_patterns(raw_html, &patterns, &packaged);

        let preview: Vec<Option<String>> = assets.iter().map(preview_reference).collect();
        let mut preview_html = replace_patterns(raw_html, &patterns, &preview);

        if let Some(base) = &self.base_url {
            preview_html = inject_base_tag(&preview_html, base);
        }

        Ok(VariantOutput {
            variants: HtmlVariants {
                preview_html,
                packaged_html,
            },
            assets,
        })
    }
}

/// Insert `<base href="{href}/">` right after the first opening `<head>` tag.
///
/// Without a `<head>` tag the HTML is returned unchanged.
pub fn inject_base_tag(html: &str, href: &str) -> String {
    let href = href.trim().trim_end_matches('/');
    if href.is_empty() {
        return html.to_string();
    }
    let Some(span) = find_open_tag(html, "head") else {
        return html.to_string();
    };

    let tag = format!("<base href=\"{}/\">", escape(href));
    let mut out = String::with_capacity(html.len() + tag.len() + 6);
    out.push_str(&html[..span.end]);
    out.push_str("\n    ");
    out.push_str(&tag);
    out.push('\n');
    out.push_str(&html[span.end..]);
    out
}

/// Drop exact duplicates, keeping the first occurrence.
fn dedup(assets: Vec<Asset>) -> Vec<Asset> {
    let mut out: Vec<Asset> = Vec::with_capacity(assets.len());
    for asset in assets {
        if !out.contains(&asset) {
            out.push(asset);
        }
    }
    out
}

fn overlaps(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// First pair of candidates from different assets that overlap.
pub(super) fn find_overlap(left: &Asset, right: &Asset) -> Option<(String, String)> {
    let right_candidates = right.candidates();
    left.candidates().into_iter().find_map(|l| {
        right_candidates
            .iter()
            .find(|r| overlaps(&l, r))
            .map(|r| (l.clone(), r.clone()))
    })
}

/// Fail when two distinct assets share or contain each other's match strings.
///
/// Identical assets are not an overlap; they collapse during [`VariantBuilder::build`].
pub fn check_disjoint(assets: &[Asset]) -> Result<(), VariantError> {
    for (i, left) in assets.iter().enumerate() {
        for right in &assets[i + 1..] {
            if left == right {
                continue;
            }
            if let Some((first, second)) = find_overlap(left, right) {
                return Err(VariantError::OverlappingCandidates { first, second });
            }
        }
    }
    Ok(())
}

/// Undeclared `/uploads/<name>` paths that exist on disk, as extra assets.
fn implicit_uploads(raw_html: &str, upload_dir: &Path, declared: &[Asset]) -> Vec<Asset> {
    let mut seen = FxHashSet::default();
    let mut found: Vec<Asset> = Vec::new();

    for m in UPLOAD_PATH.find_iter(raw_html) {
        let relative = m.as_str();
        if !seen.insert(relative) {
            continue;
        }
        let covered = declared
            .iter()
            .flat_map(Asset::candidates)
            .any(|c| c.contains(relative));
        if covered {
            continue;
        }

        let name = &relative["/uploads/".len()..];
        if name.starts_with('.') {
            continue;
        }
        let path = upload_dir.join(name);
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }

        let asset = Asset {
            url: None,
            relative_url: Some(relative.to_string()),
            mime: mime::from_path(&path).to_string(),
            storage_path: Some(path),
            filename: name.to_string(),
            size: meta.len(),
        };

        if let Some((a, b)) = declared
            .iter()
            .chain(&found)
            .find_map(|other| find_overlap(&asset, other))
        {
            debug!("asset"; "skipped implicit upload {}: overlaps `{}` / `{}`", relative, a, b);
            continue;
        }
        found.push(asset);
    }

    found
}

/// All match strings, longest first, tagged with their asset index.
fn match_patterns(assets: &[Asset]) -> Vec<(String, usize)> {
    let mut patterns: Vec<(String, usize)> = assets
        .iter()
        .enumerate()
        .flat_map(|(i, asset)| asset.candidates().into_iter().map(move |c| (c, i)))
        .collect();
    patterns.sort_by_key(|(c, _)| std::cmp::Reverse(c.len()));
    patterns
}

/// Archive path when the asset will be packaged, else no replacement.
fn packaged_reference(asset: &Asset) -> Option<String> {
    (asset.is_storable() && asset.existing_file().is_some()).then(|| asset.packaged_path())
}

/// Data URI when the file is readable, else the absolute URL.
fn preview_reference(asset: &Asset) -> Option<String> {
    if let Some(path) = asset.existing_file() {
        match fs::read(path) {
            Ok(bytes) => {
                let mime = mime::normalize(asset.effective_mime());
                return Some(format!("data:{mime};base64,{}", STANDARD.encode(bytes)));
            }
            Err(e) => debug!("asset"; "cannot inline {}: {}", path.display(), e),
        }
    }
    asset.url.clone().filter(|u| !u.is_empty())
}

/// Single left-to-right pass replacing every pattern occurrence.
///
/// At each position the longest pattern wins. A pattern whose asset has no
/// replacement is copied through unchanged.
fn replace_patterns(text: &str, patterns: &[(String, usize)], replacements: &[Option<String>]) -> String {
    if patterns.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        let hit = patterns
            .iter()
            .find(|(pattern, _)| rest.starts_with(pattern.as_str()));

        match hit {
            Some((pattern, index)) => {
                match &replacements[*index] {
                    Some(replacement) => out.push_str(replacement),
                    None => out.push_str(pattern),
                }
                rest = &rest[pattern.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}
