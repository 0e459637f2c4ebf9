//! `sitesmith generate`: run the whole pipeline offline and write the archive.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GenerateArgs;
use crate::config::AppConfig;
use crate::logger::StepLine;
use crate::package::{ArchiveStore, write_archive};
use crate::pipeline::{GenerationRequest, Pipeline};
use crate::{core::WebsiteType, log};

/// Generate one website and write it to `args.output`.
pub fn generate_site(args: &GenerateArgs, config: &AppConfig) -> Result<()> {
    let steps = StepLine::new(&["load", "generate", "write"]);

    let request = load_request(args)?;
    steps.advance("load");

    fs::create_dir_all(config.upload_dir())
        .with_context(|| format!("Failed to create {}", config.upload_dir().display()))?;
    let store = Arc::new(ArchiveStore::new(config.archive.retention()));
    let mut pipeline = Pipeline::from_config(config, Arc::clone(&store))?;
    if config.serve.public_url.is_some() {
        pipeline = pipeline.with_base_url(config.serve.base_url());
    }

    let generated = pipeline.run(request)?;
    steps.advance("generate");

    let entry = store.entry(&generated.created.id.to_string())?;
    write_zip(&args.output, |writer| {
        Ok(write_archive(writer, &entry.files, &entry.assets)?)
    })?;
    if let Some(preview) = &args.preview {
        fs::write(preview, &generated.response.html)
            .with_context(|| format!("Failed to write {}", preview.display()))?;
    }
    steps.finish();

    log!(
        "generate";
        "{} ({} chars, {} asset(s))",
        args.output.display(),
        generated.response.metadata.code_length,
        entry.assets.len()
    );
    Ok(())
}

/// Assemble a request body from the argument files and validate it.
fn load_request(args: &GenerateArgs) -> Result<GenerationRequest> {
    let mut body = json!({
        "websiteType": args.website_type,
        "userData": read_json(&args.data)?,
        "colorScheme": args.color_scheme,
    });
    if let Some(path) = &args.customizations {
        body["customizations"] = read_json(path)?;
    }
    if let Some(path) = &args.assets {
        body["uploadedAssets"] = read_json(path)?;
    }
    Ok(GenerationRequest::from_json(&body)?)
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn write_zip(
    path: &Path,
    write: impl FnOnce(BufWriter<File>) -> Result<BufWriter<File>>,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = write(BufWriter::new(file))?;
    writer.flush()?;
    Ok(())
}

/// `sitesmith types`
pub fn list_types() {
    for kind in WebsiteType::ALL {
        println!("{} {:<10} {}", kind.icon(), kind.as_str(), kind.description());
    }
}
