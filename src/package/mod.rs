//! Packaging and archive storage.
//!
//! - `store` - in-memory [`ArchiveStore`] keyed by website id
//! - `archive` - ZIP encoding of an entry
//! - `readme` - README.md included in every archive
//! - `sweeper` - background eviction of expired entries

mod archive;
mod readme;
mod store;
mod sweeper;

pub use archive::write_archive;
pub use store::{
    ArchiveStore, Clock, CreatedWebsite, INDEX_FILE, README_FILE, SystemClock, WebsiteEntry,
    download_url,
};
pub use sweeper::{spawn_sweeper, wait_for_sweeper};

#[cfg(test)]
pub use store::ManualClock;
