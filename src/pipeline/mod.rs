//! Generation request orchestration.
//!
//! ```text
//! request ──► validate
//!         ──► collect_assets (declared + discovered remote images)
//!         ──► WebsiteGenerator (prompt, model call, repair)
//!         ──► VariantBuilder (preview / packaged HTML)
//!         ──► ArchiveStore::create_website (packaged HTML + assets)
//!         ──► GenerationResponse
//! ```
//!
//! Every step runs in sequence on the calling thread. Only validation and
//! the model call can fail a request; individual image downloads never do.
//! Declared assets with overlapping URLs are a validation error, and
//! discovered images that would overlap are skipped before download.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::{
    Asset, HtmlVariants, HttpImageSource, ImageHeuristic, ImageSource, VariantBuilder,
    check_disjoint, collect_assets,
};
use crate::config::AppConfig;
use crate::core::{SiteError, SiteResult, WebsiteType};
use crate::generator::WebsiteGenerator;
use crate::package::{ArchiveStore, CreatedWebsite};
use crate::utils::date::DateTimeUtc;
use crate::{debug, log};

// ============================================================================
// request / response
// ============================================================================

/// Validated `POST /api/website/generate` body.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub website_type: WebsiteType,
    pub user_data: Value,
    pub color_scheme: String,
    pub customizations: Option<Value>,
    pub uploaded_assets: Vec<Asset>,
}

impl GenerationRequest {
    /// Validate a raw JSON body, reporting every problem at once.
    pub fn from_json(body: &Value) -> SiteResult<Self> {
        let Some(map) = body.as_object() else {
            return Err(SiteError::validation("Request body must be a JSON object"));
        };
        let mut errors = Vec::new();

        let website_type = map
            .get("websiteType")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<WebsiteType>().ok());
        if website_type.is_none() {
            errors.push("Invalid website type".to_string());
        }

        let user_data = map.get("userData").filter(|v| v.is_object()).cloned();
        if user_data.is_none() {
            errors.push("User data is required and must be an object".to_string());
        }

        let color_scheme = map
            .get("colorScheme")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if color_scheme.is_none() {
            errors.push("Color scheme is required".to_string());
        }

        let customizations = map.get("customizations").filter(|v| !v.is_null()).cloned();

        let uploaded_assets = match parse_assets(map.get("uploadedAssets")) {
            Ok(assets) => {
                if let Err(e) = check_disjoint(&assets) {
                    errors.push(format!("Invalid uploaded assets: {e}"));
                }
                assets
            }
            Err(message) => {
                errors.push(message);
                Vec::new()
            }
        };

        match (website_type, user_data, color_scheme) {
            (Some(website_type), Some(user_data), Some(color_scheme)) if errors.is_empty() => {
                Ok(Self {
                    website_type,
                    user_data,
                    color_scheme,
                    customizations,
                    uploaded_assets,
                })
            }
            _ => Err(SiteError::Validation(errors)),
        }
    }
}

/// `uploadedAssets`: absent or null is empty; null entries are dropped.
fn parse_assets(value: Option<&Value>) -> Result<Vec<Asset>, String> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err("Uploaded assets must be a list".to_string()),
    };
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| {
            Asset::deserialize(item).map_err(|e| format!("Invalid uploaded asset: {e}"))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub website_type: WebsiteType,
    pub generated_at: String,
    pub color_scheme: String,
    pub code_length: usize,
}

/// `data` of a successful generation response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    /// Preview variant.
    pub html: String,
    pub download_url: String,
    pub files: Vec<String>,
    pub metadata: GenerationMetadata,
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct Generated {
    pub response: GenerationResponse,
    pub created: CreatedWebsite,
    pub variants: HtmlVariants,
    pub assets: Vec<Asset>,
}

// ============================================================================
// pipeline
// ============================================================================

pub struct Pipeline {
    generator: WebsiteGenerator,
    images: Arc<dyn ImageSource>,
    store: Arc<ArchiveStore>,
    heuristic: ImageHeuristic,
    variants: VariantBuilder,
    upload_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        generator: WebsiteGenerator,
        images: Arc<dyn ImageSource>,
        store: Arc<ArchiveStore>,
        heuristic: ImageHeuristic,
        upload_dir: PathBuf,
    ) -> Self {
        let variants = VariantBuilder::new().with_upload_dir(upload_dir.clone());
        Self {
            generator,
            images,
            store,
            heuristic,
            variants,
            upload_dir,
        }
    }

    /// HTTP-backed pipeline for `config`.
    pub fn from_config(config: &AppConfig, store: Arc<ArchiveStore>) -> SiteResult<Self> {
        let generator = WebsiteGenerator::from_config(&config.llm)?;
        let images = Arc::new(HttpImageSource::new(config.assets.fetch_timeout())?);
        Ok(Self::new(
            generator,
            images,
            store,
            ImageHeuristic::from_config(&config.assets),
            config.upload_dir().to_path_buf(),
        ))
    }

    /// Inject `<base href>` into previews.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.variants = self.variants.with_base_url(base_url);
        self
    }

    pub fn store(&self) -> &Arc<ArchiveStore> {
        &self.store
    }

    pub fn generator(&self) -> &WebsiteGenerator {
        &self.generator
    }

    pub fn run(&self, request: GenerationRequest) -> SiteResult<Generated> {
        let GenerationRequest {
            website_type,
            user_data,
            color_scheme,
            customizations,
            uploaded_assets,
        } = request;

        log!("generate"; "{} website, form data {} bytes", website_type, user_data.to_string().len());

        let assets = collect_assets(
            &user_data,
            uploaded_assets,
            &self.heuristic,
            self.images.as_ref(),
            &self.upload_dir,
        );
        debug!("generate"; "{} asset(s) collected", assets.len());

        let finalized = self.generator.generate(
            website_type,
            &user_data,
            &color_scheme,
            customizations.as_ref(),
        )?;
        let code_length = finalized.html.chars().count();

        let output = self
            .variants
            .build(&finalized.html, assets)
            .map_err(|e| SiteError::validation(e.to_string()))?;

        let created = self.store.create_website(
            output.variants.packaged_html.clone(),
            website_type,
            output.assets.clone(),
        );
        log!("generate"; "stored {} ({} chars, {} asset(s))", created.id, code_length, output.assets.len());

        let response = GenerationResponse {
            html: output.variants.preview_html.clone(),
            download_url: created.download_url.clone(),
            files: created.files.clone(),
            metadata: GenerationMetadata {
                website_type,
                generated_at: DateTimeUtc::now().to_rfc3339(),
                color_scheme,
                code_length,
            },
        };

        Ok(Generated {
            response,
            created,
            variants: output.variants,
            assets: output.assets,
        })
    }
}
