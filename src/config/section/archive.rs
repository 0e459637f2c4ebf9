//! `[archive]` section configuration.
//!
//! Retention of generated websites held in memory for download.
//!
//! # Example
//!
//! ```toml
//! [archive]
//! retention_secs = 3600        # Entries older than this are gone
//! sweep_interval_secs = 1800   # How often expired entries are evicted
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Archive store retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
}

impl ArchiveConfig {
    pub const RETENTION: FieldPath = FieldPath::new("archive.retention_secs");
    pub const SWEEP_INTERVAL: FieldPath = FieldPath::new("archive.sweep_interval_secs");

    pub const fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.retention_secs == 0 {
            diag.error(Self::RETENTION, "must be at least 1 second");
        }
        if self.sweep_interval_secs == 0 {
            diag.error(Self::SWEEP_INTERVAL, "must be at least 1 second");
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            retention_secs: 60 * 60,
            sweep_interval_secs: 30 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_archive_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.archive.retention().as_secs(), 3600);
        assert_eq!(config.archive.sweep_interval().as_secs(), 1800);
    }

    #[test]
    fn test_archive_zero_rejected() {
        let config = test_parse_config("[archive]\nretention_secs = 0");
        let mut diag = ConfigDiagnostics::new();
        config.archive.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
