//! Endpoint handlers.

use serde_json::{Value, json};
use std::path::PathBuf;

use super::path::resolve_upload;
use super::response::{self, Reply};
use super::route::Route;
use crate::core::{SiteError, WebsiteType};
use crate::pipeline::{GenerationRequest, Pipeline};
use crate::utils::date::DateTimeUtc;
use crate::{debug, log};

/// Shared state behind every request.
pub struct App {
    pipeline: Pipeline,
    upload_dir: PathBuf,
}

impl App {
    pub fn new(pipeline: Pipeline, upload_dir: PathBuf) -> Self {
        Self {
            pipeline,
            upload_dir,
        }
    }

    pub fn dispatch(&self, route: Route, body: &[u8]) -> Reply {
        match route {
            Route::Generate => self.generate(body),
            Route::Download(id) => self.download(&id),
            Route::Types => types(),
            Route::BasePrompt(kind) => self.base_prompt(&kind),
            Route::Health => Reply::json(200, &response::health(&DateTimeUtc::now().to_rfc3339())),
            Route::Upload(rest) => self.upload(&rest),
            Route::Preflight => Reply::preflight(),
            Route::NotFound => Reply::route_not_found(),
        }
    }

    fn generate(&self, body: &[u8]) -> Reply {
        let request = serde_json::from_slice::<Value>(body)
            .map_err(|_| SiteError::validation("Request body must be valid JSON"))
            .and_then(|value| GenerationRequest::from_json(&value));

        let result = request.and_then(|request| self.pipeline.run(request));
        match result {
            Ok(generated) => Reply::success(generated.response, "Website generated successfully!"),
            Err(err) => {
                debug!("generate"; "request failed: {}", err);
                Reply::failure(&err)
            }
        }
    }

    fn download(&self, id: &str) -> Reply {
        match self.pipeline.store().stream(id) {
            Ok(bytes) => Reply::archive(id, bytes),
            Err(err) => Reply::failure(&err),
        }
    }

    fn base_prompt(&self, kind: &str) -> Reply {
        let Ok(kind) = kind.parse::<WebsiteType>() else {
            return Reply::error(404, "Website type not found");
        };
        Reply::success(
            json!({
                "websiteType": kind,
                "basePrompt": self.pipeline.generator().prompts().template(kind),
                "description": kind.description(),
            }),
            "Base prompt retrieved",
        )
    }

    fn upload(&self, rest: &str) -> Reply {
        let Some(path) = resolve_upload(rest, &self.upload_dir) else {
            return Reply::route_not_found();
        };
        Reply::file(&path).unwrap_or_else(|e| {
            log!("serve"; "{}", e);
            Reply::route_not_found()
        })
    }
}

fn types() -> Reply {
    Reply::success(WebsiteType::catalogue(), "Website types retrieved")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use zip::ZipArchive;

    use crate::asset::{FetchedImage, ImageHeuristic, ImageSource};
    use crate::config::{DEFAULT_IMAGE_EXTENSIONS, DEFAULT_IMAGE_KEYWORDS, LlmConfig};
    use crate::core::SiteResult;
    use crate::generator::{ChatClient, ChatRequest, PromptLibrary, WebsiteGenerator};
    use crate::package::ArchiveStore;
    use crate::utils::mime::types::{JSON, PNG, ZIP};

    const PAGE: &str = "<!DOCTYPE html><html><head></head><body><h1>Hi</h1></body></html>";

    struct Chat;

    impl ChatClient for Chat {
        fn complete(&self, _request: &ChatRequest) -> SiteResult<String> {
            Ok(PAGE.to_string())
        }
    }

    struct Offline;

    impl ImageSource for Offline {
        fn get(&self, url: &str) -> SiteResult<FetchedImage> {
            Err(SiteError::fetch(url, "offline"))
        }
    }

    fn app() -> (TempDir, App) {
        let temp = TempDir::new().unwrap();
        let upload_dir = temp.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).unwrap();
        std::fs::write(upload_dir.join("logo.png"), b"png-bytes").unwrap();

        let generator = WebsiteGenerator::new(Arc::new(Chat), PromptLibrary::default(), LlmConfig::default());
        let pipeline = Pipeline::new(
            generator,
            Arc::new(Offline),
            Arc::new(ArchiveStore::new(Duration::from_secs(3600))),
            ImageHeuristic::new(DEFAULT_IMAGE_KEYWORDS, DEFAULT_IMAGE_EXTENSIONS),
            upload_dir.clone(),
        );
        (temp, App::new(pipeline, upload_dir))
    }

    fn generate(app: &App, body: Value) -> Reply {
        app.dispatch(Route::Generate, body.to_string().as_bytes())
    }

    #[test]
    fn test_generate_then_download() {
        let (_temp, app) = app();
        let reply = generate(
            &app,
            json!({"websiteType": "blog", "userData": {"title": "Notes"}, "colorScheme": "dark"}),
        );
        assert_eq!(reply.status, 200);
        let body = reply.json_body();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Website generated successfully!");
        assert_eq!(body["data"]["metadata"]["websiteType"], "blog");
        assert_eq!(body["data"]["files"], json!(["README.md", "index.html"]));

        let url = body["data"]["downloadUrl"].as_str().unwrap();
        let id = url.rsplit('/').next().unwrap().to_string();
        let reply = app.dispatch(Route::Download(id.clone()), &[]);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, ZIP);
        assert!(reply.headers[0].1.contains(&format!("website-{id}.zip")));
        let archive = ZipArchive::new(Cursor::new(reply.body)).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_generate_validation_errors() {
        let (_temp, app) = app();
        let reply = generate(&app, json!({"websiteType": "blog"}));
        assert_eq!(reply.status, 400);
        assert_eq!(
            reply.json_body()["errors"],
            json!(["User data is required and must be an object", "Color scheme is required"])
        );

        let reply = app.dispatch(Route::Generate, b"{not json");
        assert_eq!(reply.status, 400);
    }

    #[test]
    fn test_download_unknown_id() {
        let (_temp, app) = app();
        let reply = app.dispatch(Route::Download("missing".into()), &[]);
        assert_eq!(reply.status, 404);
        assert_eq!(reply.json_body()["success"], false);
    }

    #[test]
    fn test_types_and_base_prompt() {
        let (_temp, app) = app();
        let reply = app.dispatch(Route::Types, &[]);
        let body = reply.json_body();
        assert_eq!(body["data"].as_array().unwrap().len(), 6);
        assert_eq!(body["data"][0]["id"], "portfolio");

        let reply = app.dispatch(Route::BasePrompt("news".into()), &[]);
        let body = reply.json_body();
        assert_eq!(body["data"]["websiteType"], "news");
        assert!(body["data"]["basePrompt"].as_str().unwrap().contains("${userData}"));

        let reply = app.dispatch(Route::BasePrompt("shop".into()), &[]);
        assert_eq!(reply.status, 404);
        assert_eq!(reply.json_body()["error"], "Website type not found");
    }

    #[test]
    fn test_health_and_unknown_route() {
        let (_temp, app) = app();
        let reply = app.dispatch(Route::Health, &[]);
        assert_eq!(reply.content_type, JSON);
        assert_eq!(reply.json_body()["status"], "OK");

        let reply = app.dispatch(Route::NotFound, &[]);
        assert_eq!(reply.status, 404);
        assert_eq!(reply.json_body()["error"], "Route not found");
    }

    #[test]
    fn test_serves_uploads() {
        let (_temp, app) = app();
        let reply = app.dispatch(Route::Upload("logo.png".into()), &[]);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, PNG);
        assert_eq!(reply.body, b"png-bytes");

        let reply = app.dispatch(Route::Upload("../logo.png".into()), &[]);
        assert_eq!(reply.status, 404);
    }
}
