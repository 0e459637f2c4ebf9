//! Request routing.

use tiny_http::Method;

/// Every endpoint the server answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `POST /api/website/generate`
    Generate,
    /// `GET /api/website/download/:id` and `GET /download/:id`
    Download(String),
    /// `GET /api/prompts/types`
    Types,
    /// `GET /api/prompts/base/:type`
    BasePrompt(String),
    /// `GET /api/health`
    Health,
    /// `GET /uploads/*`, raw remainder of the path
    Upload(String),
    /// `OPTIONS` on anything
    Preflight,
    NotFound,
}

impl Route {
    pub fn parse(method: &Method, url: &str) -> Self {
        if matches!(method, Method::Get | Method::Head)
            && let Some(rest) = url.strip_prefix("/uploads/")
        {
            let file = rest.split('?').next().unwrap_or(rest);
            return if file.trim_matches('/').is_empty() {
                Self::NotFound
            } else {
                Self::Upload(rest.to_string())
            };
        }

        let path = url.split('?').next().unwrap_or(url);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match (method, segments.as_slice()) {
            (Method::Options, _) => Self::Preflight,
            (Method::Post, ["api", "website", "generate"]) => Self::Generate,
            (Method::Get, ["api", "website", "download", id] | ["download", id]) => {
                Self::Download((*id).to_string())
            }
            (Method::Get, ["api", "prompts", "types"]) => Self::Types,
            (Method::Get, ["api", "prompts", "base", kind]) => Self::BasePrompt((*kind).to_string()),
            (Method::Get, ["api", "health"]) => Self::Health,
            _ => Self::NotFound,
        }
    }
}
