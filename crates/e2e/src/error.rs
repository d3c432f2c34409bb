//! Error types for smoke checks

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("node not found (looked for `{0}`). Install Node.js to run browser checks")]
    NodeNotFound(String),

    #[error("Playwright not found. Install with: npm install playwright && npx playwright install chromium")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Check failed: {attribute} of {selector}: expected {expected:?}, got {}", observed(.actual))]
    CheckFailed {
        selector: String,
        attribute: String,
        expected: String,
        actual: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type SmokeResult<T> = Result<T, SmokeError>;

fn observed(actual: &Option<String>) -> String {
    match actual {
        Some(value) => format!("{:?}", value),
        None => "<missing>".to_string(),
    }
}
