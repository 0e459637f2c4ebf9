//! `[llm]` section configuration.
//!
//! Chat-completion endpoint used to synthesize websites.
//!
//! # Example
//!
//! ```toml
//! [llm]
//! endpoint = "https://api.deepseek.com/v1"
//! model = "deepseek-coder"
//! api_key_env = "DEEPSEEK_API_KEY"   # The key itself is never stored in the file
//! temperature = 0.7
//! max_tokens = 8000
//! top_p = 0.9
//! timeout_secs = 120
//! prompt_dir = "prompts"             # Optional `<type>.prompt.txt` overrides
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub endpoint: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Environment variable holding the bearer token.
    pub api_key_env: String,

    pub temperature: f32,

    /// Token ceiling for a single completion.
    pub max_tokens: u32,

    pub top_p: f32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Directory with per-type prompt templates overriding the built-in ones.
    pub prompt_dir: Option<PathBuf>,
}

impl LlmConfig {
    pub const ENDPOINT: FieldPath = FieldPath::new("llm.endpoint");
    pub const TEMPERATURE: FieldPath = FieldPath::new("llm.temperature");
    pub const TOP_P: FieldPath = FieldPath::new("llm.top_p");
    pub const MAX_TOKENS: FieldPath = FieldPath::new("llm.max_tokens");
    pub const TIMEOUT: FieldPath = FieldPath::new("llm.timeout_secs");

    /// Full chat-completion URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if url::Url::parse(&self.endpoint).is_err() {
            diag.error(Self::ENDPOINT, format!("`{}` is not a valid URL", self.endpoint));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            diag.error(Self::TEMPERATURE, "must be between 0 and 2");
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            diag.error(Self::TOP_P, "must be in (0, 1]");
        }
        if self.max_tokens == 0 {
            diag.error(Self::MAX_TOKENS, "must be at least 1");
        }
        if self.timeout_secs == 0 {
            diag.error(Self::TIMEOUT, "must be at least 1 second");
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.com/v1".into(),
            model: "deepseek-coder".into(),
            api_key_env: "DEEPSEEK_API_KEY".into(),
            temperature: 0.7,
            max_tokens: 8000,
            top_p: 0.9,
            timeout_secs: 120,
            prompt_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_llm_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.llm.model, "deepseek-coder");
        assert_eq!(config.llm.max_tokens, 8000);
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(
            config.llm.completions_url(),
            "https://api.deepseek.com/v1/chat/completions"
        );
        assert_eq!(config.llm.timeout().as_secs(), 120);
    }

    #[test]
    fn test_llm_override() {
        let config = test_parse_config(
            "[llm]\nendpoint = \"http://localhost:8080/v1/\"\nmodel = \"local\"\ntemperature = 0.2",
        );
        assert_eq!(config.llm.model, "local");
        assert_eq!(
            config.llm.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_llm_validate_ranges() {
        let config = test_parse_config("[llm]\ntemperature = 3.0\ntop_p = 0.0\ntimeout_secs = 0");
        let mut diag = ConfigDiagnostics::new();
        config.llm.validate(&mut diag);
        assert_eq!(diag.len(), 3);
    }
}
