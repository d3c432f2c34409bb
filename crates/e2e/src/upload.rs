//! Upload endpoint smoke check
//!
//! Posts a single-pixel PNG as multipart/form-data and expects
//! `200 {"url": "http..."}`. Every outcome, transport errors included, is
//! reported as data rather than raised.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SmokeResult;
use crate::fixture::write_fixture;
use crate::multipart::{MultipartBody, DEFAULT_BOUNDARY};

/// Configuration for the upload check
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub endpoint: String,
    pub boundary: String,
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    /// Where the fixture image is written before upload
    pub image_path: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/upload".to_string(),
            boundary: DEFAULT_BOUNDARY.to_string(),
            field: "file".to_string(),
            file_name: "test_image.png".to_string(),
            content_type: "image/png".to_string(),
            image_path: PathBuf::from("test_image.png"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// 200 with a JSON `url` starting with `http`
    Success { url: String },
    /// 200 but the body is not the expected JSON shape
    InvalidResponse,
    /// Any status other than 200
    BadStatus { status: u16 },
    /// The request never produced a response
    Error { message: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Success { .. } => write!(f, "SUCCESS: Image uploaded and URL returned."),
            UploadOutcome::InvalidResponse => write!(f, "FAILURE: Invalid response format."),
            UploadOutcome::BadStatus { .. } => write!(f, "FAILURE: Upload status not 200."),
            UploadOutcome::Error { message } => write!(f, "ERROR: {}", message),
        }
    }
}

/// Everything observed during one upload attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub endpoint: String,
    pub status: Option<u16>,
    pub body: Option<String>,
    pub outcome: UploadOutcome,
}

impl UploadReport {
    /// Lines printed for this attempt, in order
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(status) = self.status {
            lines.push(format!("Status Code: {}", status));
        }
        if let Some(body) = &self.body {
            lines.push(format!("Response: {}", body));
        }
        lines.push(self.outcome.to_string());
        lines
    }
}

/// Classify a response the way the endpoint contract describes
pub fn classify_response(status: u16, body: &str) -> UploadOutcome {
    if status != 200 {
        return UploadOutcome::BadStatus { status };
    }
    let url = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("url").and_then(|u| u.as_str()).map(str::to_owned));
    match url {
        Some(url) if url.starts_with("http") => UploadOutcome::Success { url },
        _ => UploadOutcome::InvalidResponse,
    }
}

pub struct UploadProbe {
    config: UploadConfig,
    client: reqwest::Client,
}

impl UploadProbe {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Build the request body from the fixture written to disk
    pub fn build_body(&self) -> SmokeResult<MultipartBody> {
        let data = write_fixture(&self.config.image_path)?;
        debug!(
            "Fixture {} ({} bytes)",
            self.config.image_path.display(),
            data.len()
        );
        Ok(MultipartBody::new(self.config.boundary.clone()).file(
            self.config.field.clone(),
            self.config.file_name.clone(),
            self.config.content_type.clone(),
            data,
        ))
    }

    /// Send the upload. Only fixture IO fails; HTTP problems become outcomes.
    pub async fn run(&self) -> SmokeResult<UploadReport> {
        let body = self.build_body()?;
        info!("Uploading {} to {}", self.config.file_name, self.config.endpoint);

        let sent = self
            .client
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, body.content_type())
            .body(body.to_bytes())
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warn!("Upload request failed: {}", e);
                return Ok(self.report(None, None, UploadOutcome::Error { message: e.to_string() }));
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return Ok(self.report(
                    Some(status),
                    None,
                    UploadOutcome::Error { message: e.to_string() },
                ))
            }
        };

        let outcome = classify_response(status, &text);
        Ok(self.report(Some(status), Some(text), outcome))
    }

    fn report(&self, status: Option<u16>, body: Option<String>, outcome: UploadOutcome) -> UploadReport {
        UploadReport {
            endpoint: self.config.endpoint.clone(),
            status,
            body,
            outcome,
        }
    }
}
