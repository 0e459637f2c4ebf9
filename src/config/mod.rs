//! Application configuration for `sitesmith.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── archive    # [archive]
//! │   ├── assets     # [assets]
//! │   ├── llm        # [llm]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! A missing config file is not an error: every section has defaults, so
//! `sitesmith serve` works out of the box once the API key is exported.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, normalize_path};

pub use section::{
    ArchiveConfig, AssetsConfig, DEFAULT_IMAGE_EXTENSIONS, DEFAULT_IMAGE_KEYWORDS, LlmConfig,
    ServeConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sitesmith.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Model endpoint settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Asset storage and discovery
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Generated website retention
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl AppConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = path;
                config
            }
            None => {
                log!("hint"; "no {} found, using defaults", cli.config.display());
                Self {
                    root: cwd.clone(),
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        config.apply_command_options(cli);
        config.normalize_paths();
        config.validate()?;
        debug!("config"; "{} (root {})", config.config_path.display(), config.root.display());

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Absolute upload directory.
    pub fn upload_dir(&self) -> &Path {
        &self.assets.upload_dir
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Commands::Serve {
            interface,
            port,
            public_url,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            if public_url.is_some() {
                self.serve.public_url = public_url.clone();
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve relative paths against the root, expanding `~`.
    fn normalize_paths(&mut self) {
        let root = normalize_path(&self.root);
        self.assets.upload_dir = Self::resolve_path(&self.assets.upload_dir, &root);
        if let Some(dir) = self.llm.prompt_dir.take() {
            self.llm.prompt_dir = Some(Self::resolve_path(&dir, &root));
        }
        self.root = root;
    }

    fn resolve_path(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        normalize_path(&full_path)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate all sections, collecting every error before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.serve.validate(&mut diag);
        self.llm.validate(&mut diag);
        self.assets.validate(&mut diag);
        self.archive.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    let (parsed, ignored) = AppConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
