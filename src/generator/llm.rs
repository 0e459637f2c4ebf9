//! Chat-completion client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::core::{SiteError, SiteResult};

/// Longest slice of an error body echoed back in a generation error.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Body of `POST {endpoint}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl ChatRequest {
    /// System instruction plus one user prompt, sampling from config.
    pub fn new(config: &LlmConfig, system: &str, prompt: String) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Something that answers a chat request with the assistant's text.
pub trait ChatClient: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> SiteResult<String>;
}

/// Blocking HTTP client authenticated with a bearer key.
pub struct HttpChatClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl HttpChatClient {
    pub fn from_config(config: &LlmConfig) -> SiteResult<Self> {
        Self::new(
            config.completions_url(),
            config.api_key(),
            config.api_key_env.clone(),
            config.timeout(),
        )
    }

    pub fn new(
        url: String,
        api_key: Option<String>,
        api_key_env: String,
        timeout: Duration,
    ) -> SiteResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SiteError::Generation(e.to_string()))?;
        Ok(Self {
            client,
            url,
            api_key,
            api_key_env,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl ChatClient for HttpChatClient {
    fn complete(&self, request: &ChatRequest) -> SiteResult<String> {
        let Some(key) = &self.api_key else {
            return Err(SiteError::Generation(format!(
                "API key missing: set the {} environment variable",
                self.api_key_env
            )));
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(key)
            .json(request)
            .send()
            .map_err(|e| SiteError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SiteError::Generation(format!(
                "HTTP {status}: {}",
                truncate(body.trim(), MAX_ERROR_BODY)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| SiteError::Generation(format!("invalid response: {e}")))?;
        first_content(parsed)
    }
}

fn first_content(response: ChatResponse) -> SiteResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| SiteError::Generation("response has no choices".into()))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
