//! Request-level error kinds.

use thiserror::Error;

/// Errors surfaced by the generation pipeline and the archive store.
///
/// Structural incompleteness of generated HTML is not an error; it is
/// repaired or replaced by the generator.
#[derive(Debug, Error)]
pub enum SiteError {
    /// Malformed or missing request fields, rejected before any work runs.
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A single remote asset could not be retrieved.
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },

    /// The model call itself failed.
    #[error("failed to generate website: {0}")]
    Generation(String),

    /// Unknown or evicted archive id.
    #[error("website `{0}` not found or expired")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status code for this error.
    pub const fn status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Fetch { .. } => 502,
            Self::Generation(_) | Self::Io(_) => 500,
        }
    }

    /// Short label used as the `error` field of API responses.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid request",
            Self::NotFound(_) => "Website not found",
            Self::Fetch { .. } => "Asset fetch failed",
            Self::Generation(_) => "Website generation failed",
            Self::Io(_) => "Internal server error",
        }
    }
}

pub type SiteResult<T> = Result<T, SiteError>;
