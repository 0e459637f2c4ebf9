//! Find image URLs inside arbitrary form data.
//!
//! A string is an image URL when it parses as an `http(s)` URL and either
//! one of the keys on its path names an image field, or the URL path ends
//! in an image extension. Best-effort: misses and rare false hits are fine.

use rustc_hash::FxHashSet;
use serde_json::Value;
use url::Url;

use crate::config::AssetsConfig;

/// Keyword and extension lists deciding what counts as an image.
#[derive(Debug, Clone)]
pub struct ImageHeuristic {
    keywords: Vec<String>,
    extensions: Vec<String>,
}

impl ImageHeuristic {
    pub fn new<K, E>(keywords: K, extensions: E) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let clean = |s: &str| s.trim().to_ascii_lowercase();
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| clean(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
            extensions: extensions
                .into_iter()
                .map(|e| clean(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &AssetsConfig) -> Self {
        Self::new(&config.image_keywords, &config.image_extensions)
    }

    /// Any key on the path contains an image keyword (case-insensitive).
    pub fn is_image_key(&self, path: &[&str]) -> bool {
        path.iter().any(|part| {
            let part = part.to_ascii_lowercase();
            self.keywords.iter().any(|k| part.contains(k.as_str()))
        })
    }

    /// URL path ends with a known image extension.
    pub fn has_image_extension(&self, url: &Url) -> bool {
        let path = url.path().to_ascii_lowercase();
        self.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }

    /// Decide whether `value` found under `path` should be fetched as an image.
    pub fn is_image_value(&self, path: &[&str], value: &str) -> bool {
        let Some(url) = parse_http_url(value) else {
            return false;
        };
        self.is_image_key(path) || self.has_image_extension(&url)
    }
}

/// Parse `value` as an absolute `http` or `https` URL.
pub fn parse_http_url(value: &str) -> Option<Url> {
    let url = Url::parse(value).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Collect unique image URLs from a form data tree, in first-seen order.
pub fn find_image_urls(data: &Value, heuristic: &ImageHeuristic) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = FxHashSet::default();
    let mut path = Vec::new();
    walk(data, &mut path, heuristic, &mut found, &mut seen);
    found
}

fn walk<'a>(
    value: &'a Value,
    path: &mut Vec<&'a str>,
    heuristic: &ImageHeuristic,
    found: &mut Vec<String>,
    seen: &mut FxHashSet<String>,
) {
    match value {
        Value::Array(items) => {
            for item in items {
                walk(item, path, heuristic, found, seen);
            }
        }
        Value::Object(map) => {
            for (key, val) in map {
                path.push(key.as_str());
                walk(val, path, heuristic, found, seen);
                path.pop();
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if !trimmed.is_empty()
                && heuristic.is_image_value(path, trimmed)
                && seen.insert(trimmed.to_string())
            {
                found.push(trimmed.to_string());
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
