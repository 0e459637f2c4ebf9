//! `[serve]` section configuration.
//!
//! Contains HTTP server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5000                 # HTTP port number
//! workers = 4                 # Request handler threads
//! public_url = "https://sites.example.com"  # Base href for preview HTML
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Number of request handler threads.
    pub workers: usize,

    /// Public origin of this server, injected as `<base href>` into preview HTML.
    /// Defaults to `http://{interface}:{port}`.
    pub public_url: Option<String>,
}

impl ServeConfig {
    pub const WORKERS: FieldPath = FieldPath::new("serve.workers");
    pub const PUBLIC_URL: FieldPath = FieldPath::new("serve.public_url");

    /// Base URL used for the preview `<base>` tag.
    pub fn base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.interface, self.port),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.workers == 0 {
            diag.error(Self::WORKERS, "must be at least 1");
        }
        if let Some(url) = &self.public_url
            && url::Url::parse(url).is_err()
        {
            diag.error_with_hint(
                Self::PUBLIC_URL,
                format!("`{url}` is not a valid URL"),
                "use an absolute origin such as https://example.com",
            );
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5000,
            workers: 4,
            public_url: None,
        }
    }
}
