//! HTTP responses.
//!
//! Handlers build a [`Reply`] and never touch the connection; the request
//! loop sends it. This keeps every handler testable without a socket.

use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::{Value, json};
use std::{fs, path::Path};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::core::SiteError;
use crate::utils::mime::types::{JSON, PLAIN, ZIP};

/// Status, content type, body and extra headers of one response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub headers: Vec<(&'static str, String)>,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Any serializable value as a JSON body.
    pub fn json(status: u16, value: &impl Serialize) -> Self {
        // Serializing plain data structs cannot fail.
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(status, JSON, body)
    }

    /// `{success: true, data, message}`
    pub fn success(data: impl Serialize, message: &str) -> Self {
        Self::json(
            200,
            &json!({ "success": true, "data": data, "message": message }),
        )
    }

    /// `{success: false, error, message}`, or `errors` for validation failures.
    pub fn failure(err: &SiteError) -> Self {
        let body = match err {
            SiteError::Validation(errors) => json!({ "success": false, "errors": errors }),
            _ => json!({ "success": false, "error": err.label(), "message": err.to_string() }),
        };
        Self::json(err.status(), &body)
    }

    /// `{success: false, error}` with a fixed status.
    pub fn error(status: u16, error: &str) -> Self {
        Self::json(status, &json!({ "success": false, "error": error }))
    }

    pub fn route_not_found() -> Self {
        Self::error(404, "Route not found")
    }

    /// 503 while the server drains.
    pub fn unavailable() -> Self {
        Self::new(503, PLAIN, b"503 Service Unavailable".to_vec())
    }

    /// 204 answer to a CORS preflight.
    pub fn preflight() -> Self {
        Self::new(204, PLAIN, Vec::new())
            .with_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .with_header("Access-Control-Allow-Headers", "Content-Type, Authorization")
    }

    /// ZIP archive download for website `id`.
    pub fn archive(id: &str, bytes: Vec<u8>) -> Self {
        Self::new(200, ZIP, bytes).with_header(
            "Content-Disposition",
            format!("attachment; filename=\"website-{id}.zip\""),
        )
    }

    /// Static file with a content type guessed from its extension.
    pub fn file(path: &Path) -> Result<Self> {
        let body = fs::read(path).map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
        Ok(Self::new(200, crate::utils::mime::from_path(path), body))
    }

    /// Parse the body back as JSON.
    #[cfg(test)]
    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Write the reply to the connection.
    pub fn send(self, request: Request) -> Result<()> {
        let mut response = Response::from_data(self.body)
            .with_status_code(StatusCode(self.status))
            .with_header(make_header("Content-Type", self.content_type)?)
            .with_header(make_header("Access-Control-Allow-Origin", "*")?);
        for (name, value) in &self.headers {
            response.add_header(make_header(name, value)?);
        }
        request.respond(response)?;
        Ok(())
    }
}

fn make_header(name: &str, value: &str) -> Result<Header> {
    if name.contains(['\r', '\n']) || value.contains(['\r', '\n']) {
        return Err(anyhow!("invalid header `{name}`: line break in value"));
    }
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header `{name}: {value}`"))
}

/// Health payload, not wrapped in the success envelope.
pub fn health(timestamp: &str) -> Value {
    json!({
        "status": "OK",
        "message": "Sitesmith API is running",
        "timestamp": timestamp,
    })
}
