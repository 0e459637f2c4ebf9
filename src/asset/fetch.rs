//! Download remote images into the upload directory.
//!
//! Network access sits behind [`ImageSource`] so batch collection can be
//! exercised without a server.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use percent_encoding::percent_decode_str;
use rustc_hash::FxHashSet;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::discover::{ImageHeuristic, find_image_urls, parse_http_url};
use super::variants::find_overlap;
use super::Asset;
use crate::core::{SiteError, SiteResult};
use crate::utils::mime;
use crate::{debug, log};

/// Extension used when neither the MIME type nor the URL names one.
const FALLBACK_EXTENSION: &str = ".img";

/// Raw response of an image download.
#[derive(Debug, Clone, Default)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Something that can GET a URL and hand back its bytes.
pub trait ImageSource: Send + Sync {
    fn get(&self, url: &str) -> SiteResult<FetchedImage>;
}

/// Blocking HTTP source with a per-request timeout.
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

impl HttpImageSource {
    pub fn new(timeout: Duration) -> SiteResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sitesmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SiteError::fetch("<client>", e))?;
        Ok(Self { client })
    }
}

impl ImageSource for HttpImageSource {
    fn get(&self, url: &str) -> SiteResult<FetchedImage> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| SiteError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteError::fetch(url, format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().map_err(|e| SiteError::fetch(url, e))?;

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

/// Fetch one image and persist it under `upload_dir`.
///
/// The response must be an image by content type, or the URL must carry an
/// image extension; anything else is a fetch error.
pub fn download_remote_image(
    source: &dyn ImageSource,
    url: &str,
    upload_dir: &Path,
) -> SiteResult<Asset> {
    let parsed = parse_http_url(url).ok_or_else(|| SiteError::fetch(url, "not an http(s) URL"))?;
    let fetched = source.get(url)?;

    let declared = fetched
        .content_type
        .as_deref()
        .map(mime::normalize)
        .unwrap_or_default();
    let url_ext = url_extension(&parsed);

    let mime_type = if mime::is_image(&declared) {
        declared
    } else if let Some(guessed) = url_ext.as_deref().and_then(mime::image_mime_for_extension) {
        guessed.to_string()
    } else {
        let reason = if declared.is_empty() {
            "no content type and no image extension".to_string()
        } else {
            format!("`{declared}` is not an image type")
        };
        return Err(SiteError::fetch(url, reason));
    };

    let extension = mime::image_extension(&mime_type)
        .map(str::to_string)
        .or(url_ext)
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    let storage_name = storage_name(&extension);
    let storage_path = upload_dir.join(&storage_name);

    fs::create_dir_all(upload_dir)?;
    fs::write(&storage_path, &fetched.bytes)?;
    debug!("fetch"; "{} -> {}", url, storage_path.display());

    let filename = url_file_name(&parsed).unwrap_or_else(|| storage_name.clone());

    Ok(Asset {
        url: Some(url.to_string()),
        relative_url: Some(format!("/uploads/{storage_name}")),
        storage_path: Some(storage_path),
        filename,
        mime: mime_type,
        size: fetched.bytes.len() as u64,
    })
}

/// Merge declared assets with images discovered in `user_data`.
///
/// Declared assets come first, unchanged. Discovered URLs already known by
/// `url` or `relativeUrl` are skipped, as are URLs that contain or are
/// contained in a match string of an asset kept so far. Failed downloads are
/// logged and dropped without aborting the batch.
pub fn collect_assets(
    user_data: &Value,
    declared: Vec<Asset>,
    heuristic: &ImageHeuristic,
    source: &dyn ImageSource,
    upload_dir: &Path,
) -> Vec<Asset> {
    let mut assets: Vec<Asset> = declared.into_iter().filter(|a| !is_blank(a)).collect();

    let mut known: FxHashSet<String> = FxHashSet::default();
    for asset in &assets {
        known.extend(asset.url.iter().cloned());
        known.extend(asset.relative_url.iter().cloned());
    }

    for url in find_image_urls(user_data, heuristic) {
        if known.contains(&url) {
            continue;
        }
        let pending = Asset {
            url: Some(url.clone()),
            ..Asset::default()
        };
        if let Some((_, other)) = assets.iter().find_map(|a| find_overlap(&pending, a)) {
            log!("fetch"; "skipped {}: overlaps `{}`", url, other);
            continue;
        }
        match download_remote_image(source, &url, upload_dir) {
            Ok(asset) => {
                known.insert(url);
                assets.push(asset);
            }
            Err(e) => log!("fetch"; "skipped {}: {}", url, e),
        }
    }

    assets
}

fn is_blank(asset: &Asset) -> bool {
    asset.url.as_deref().is_none_or(str::is_empty)
        && asset.relative_url.as_deref().is_none_or(str::is_empty)
        && asset.storage_path.is_none()
        && asset.filename.is_empty()
}

/// `<unix-millis>-<uuid v4><ext>`
fn storage_name(extension: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{millis}-{}{extension}", Uuid::new_v4())
}

/// Lowercase extension (with dot) of the URL path's last segment.
fn url_extension(url: &Url) -> Option<String> {
    let name = url.path_segments()?.next_back()?;
    let dot = name.rfind('.').filter(|&i| i > 0)?;
    let ext = &name[dot + 1..];
    (!ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| format!(".{}", ext.to_ascii_lowercase()))
}

/// Decoded last path segment, if any.
fn url_file_name(url: &Url) -> Option<String> {
    let raw = url.path_segments()?.next_back()?;
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let name = decoded.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    (!name.is_empty()).then(|| name.to_string())
}
