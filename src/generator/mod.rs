//! Website code generation.
//!
//! ```text
//! template ──► construct_prompt ──► ChatClient ──► strip fences ──► repair ──► HTML
//! ```
//!
//! The model call is the only fatal step. An incomplete answer is repaired
//! rule by rule, or replaced by a fallback page.

pub mod complete;
pub mod llm;
pub mod prompt;
pub mod repair;

pub use complete::{is_code_complete, strip_code_fences};
pub use llm::{ChatClient, ChatMessage, ChatRequest, HttpChatClient};
pub use prompt::{PromptLibrary, SYSTEM_PROMPT, construct_prompt};
pub use repair::{FALLBACK_HTML, Finalized, finalize_code};

use std::sync::Arc;

use serde_json::Value;

use crate::config::LlmConfig;
use crate::core::{SiteResult, WebsiteType};
use crate::{debug, log};

/// Turns form data into a complete HTML document.
pub struct WebsiteGenerator {
    client: Arc<dyn ChatClient>,
    prompts: PromptLibrary,
    llm: LlmConfig,
}

impl WebsiteGenerator {
    pub fn new(client: Arc<dyn ChatClient>, prompts: PromptLibrary, llm: LlmConfig) -> Self {
        Self {
            client,
            prompts,
            llm,
        }
    }

    /// HTTP-backed generator for `config`.
    pub fn from_config(llm: &LlmConfig) -> SiteResult<Self> {
        let client = HttpChatClient::from_config(llm)?;
        if !client.has_api_key() {
            log!("warning"; "{} is not set, generation requests will fail", llm.api_key_env);
        }
        Ok(Self::new(
            Arc::new(client),
            PromptLibrary::new(llm.prompt_dir.clone()),
            llm.clone(),
        ))
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub fn build_request(
        &self,
        kind: WebsiteType,
        user_data: &Value,
        color_scheme: &str,
        customizations: Option<&Value>,
    ) -> ChatRequest {
        let template = self.prompts.template(kind);
        let prompt = construct_prompt(&template, user_data, color_scheme, customizations);
        ChatRequest::new(&self.llm, SYSTEM_PROMPT, prompt)
    }

    /// Call the model and return a document that passes the completeness check.
    pub fn generate(
        &self,
        kind: WebsiteType,
        user_data: &Value,
        color_scheme: &str,
        customizations: Option<&Value>,
    ) -> SiteResult<Finalized> {
        let request = self.build_request(kind, user_data, color_scheme, customizations);
        debug!("generate"; "{} prompt, {} chars", kind, request.messages[1].content.len());

        let raw = self.client.complete(&request).inspect_err(|e| {
            log!("generate"; "{}", e);
        })?;

        let finalized = finalize_code(&raw);
        if finalized.fallback {
            log!("generate"; "output incomplete after repair, using fallback page");
        } else if finalized.was_repaired() {
            log!("generate"; "repaired output: {}", finalized.applied.join(", "));
        }
        debug!("generate"; "final document {} chars", finalized.html.len());

        Ok(finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SiteError;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Returns a fixed reply and records the last request.
    struct StubClient {
        reply: SiteResult<String>,
        last: Mutex<Option<ChatRequest>>,
    }

    impl StubClient {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                last: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(SiteError::Generation("timeout".into())),
                last: Mutex::new(None),
            }
        }
    }

    impl ChatClient for StubClient {
        fn complete(&self, request: &ChatRequest) -> SiteResult<String> {
            *self.last.lock() = Some(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(SiteError::Generation(e.to_string())),
            }
        }
    }

    fn generator(client: Arc<StubClient>) -> WebsiteGenerator {
        WebsiteGenerator::new(client, PromptLibrary::default(), LlmConfig::default())
    }

    #[test]
    fn test_generate_repairs_missing_html_close() {
        let client = Arc::new(StubClient::ok(
            "```html\n<!DOCTYPE html><html><head></head><body><h1>Jane</h1></body>",
        ));
        let out = generator(client.clone())
            .generate(WebsiteType::Portfolio, &json!({"name": "Jane"}), "modern-blue", None)
            .unwrap();

        assert!(is_code_complete(&out.html));
        assert!(out.html.ends_with("</html>"));
        assert_eq!(out.applied, vec!["close_html"]);

        let request = client.last.lock().clone().unwrap();
        assert_eq!(request.messages[0].content, SYSTEM_PROMPT);
        assert!(request.messages[1].content.contains("\"name\": \"Jane\""));
        assert!(request.messages[1].content.contains("modern-blue"));
    }

    #[test]
    fn test_generate_error_propagates() {
        let client = Arc::new(StubClient::failing());
        let err = generator(client)
            .generate(WebsiteType::Blog, &json!({}), "dark", None)
            .unwrap_err();
        assert!(matches!(err, SiteError::Generation(_)));
    }

    #[test]
    fn test_generate_garbage_falls_back() {
        let client = Arc::new(StubClient::ok("<!DOCTYPE html><html"));
        let out = generator(client)
            .generate(WebsiteType::News, &json!({}), "dark", None)
            .unwrap();
        assert!(out.fallback);
        assert_eq!(out.html, FALLBACK_HTML);
    }
}
