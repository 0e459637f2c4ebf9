//! In-memory store of generated websites.
//!
//! Entries are immutable once created and live until they are older than
//! the retention window. Expired entries are invisible to [`ArchiveStore::get`]
//! and [`ArchiveStore::stream`] even before [`ArchiveStore::sweep`] drops them.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use uuid::Uuid;

use super::{archive, readme};
use crate::asset::Asset;
use crate::core::{SiteError, SiteResult, WebsiteType};
use crate::debug;
use crate::utils::date::DateTimeUtc;

pub const INDEX_FILE: &str = "index.html";
pub const README_FILE: &str = "README.md";

/// Source of "now" for entry ages.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock(Mutex<SystemTime>);

#[cfg(test)]
impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self(Mutex::new(start))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.0.lock()
    }
}

/// One generated website.
#[derive(Debug, Clone)]
pub struct WebsiteEntry {
    pub id: Uuid,
    pub files: BTreeMap<String, String>,
    pub created_at: SystemTime,
    pub website_type: WebsiteType,
    pub assets: Vec<Asset>,
}

/// Result of storing a generated website.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWebsite {
    pub id: Uuid,
    pub files: Vec<String>,
    pub download_url: String,
}

pub fn download_url(id: Uuid) -> String {
    format!("/api/website/download/{id}")
}

/// Keyed table of [`WebsiteEntry`] guarded by a mutex.
pub struct ArchiveStore {
    entries: Mutex<FxHashMap<Uuid, Arc<WebsiteEntry>>>,
    retention: Duration,
    clock: Arc<dyn Clock>,
}

impl ArchiveStore {
    pub fn new(retention: Duration) -> Self {
        Self::with_clock(retention, Arc::new(SystemClock))
    }

    pub fn with_clock(retention: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
            retention,
            clock,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Store a file set and return its fresh id.
    pub fn create(
        &self,
        files: BTreeMap<String, String>,
        website_type: WebsiteType,
        assets: Vec<Asset>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let entry = WebsiteEntry {
            id,
            files,
            created_at: self.clock.now(),
            website_type,
            assets,
        };
        self.entries.lock().insert(id, Arc::new(entry));
        debug!("archive"; "stored {}", id);
        id
    }

    /// Store `index.html` plus a README, keeping only archivable assets.
    pub fn create_website(
        &self,
        html: String,
        website_type: WebsiteType,
        assets: Vec<Asset>,
    ) -> CreatedWebsite {
        let generated_at = DateTimeUtc::from_system_time(self.clock.now()).to_rfc3339();
        let files = BTreeMap::from([
            (INDEX_FILE.to_string(), html),
            (README_FILE.to_string(), readme::render(website_type, &generated_at)),
        ]);
        let assets: Vec<Asset> = assets.into_iter().filter(Asset::is_storable).collect();

        let names = files.keys().cloned().collect();
        let id = self.create(files, website_type, assets);
        CreatedWebsite {
            id,
            files: names,
            download_url: download_url(id),
        }
    }

    /// Live entry for `id`.
    pub fn entry(&self, id: &str) -> SiteResult<Arc<WebsiteEntry>> {
        let not_found = || SiteError::NotFound(id.to_string());
        let key = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
        let entry = self.entries.lock().get(&key).cloned().ok_or_else(not_found)?;
        if self.is_expired(&entry, self.clock.now()) {
            return Err(not_found());
        }
        Ok(entry)
    }

    /// Generated files of a live entry.
    pub fn get(&self, id: &str) -> SiteResult<BTreeMap<String, String>> {
        Ok(self.entry(id)?.files.clone())
    }

    /// ZIP archive of a live entry.
    pub fn stream(&self, id: &str) -> SiteResult<Vec<u8>> {
        let entry = self.entry(id)?;
        debug!("archive"; "packing {} {} website, {} assets", entry.id, entry.website_type, entry.assets.len());
        archive::archive_bytes(&entry.files, &entry.assets)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &WebsiteEntry, now: SystemTime) -> bool {
        now.duration_since(entry.created_at)
            .is_ok_and(|age| age > self.retention)
    }
}
