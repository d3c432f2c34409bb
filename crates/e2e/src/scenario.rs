//! Declarative scenario model, loadable from YAML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SmokeError, SmokeResult};

/// A complete browser scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Origin that relative step URLs are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Viewport size for the browser
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,

    /// Steps to execute in order
    pub steps: Vec<Step>,

    /// Page screenshot taken when a step throws, before the browser closes
    #[serde(default)]
    pub error_screenshot: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_viewport() -> Viewport {
    Viewport { width: 1280, height: 720 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A single step in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (relative to the base URL)
    Navigate {
        url: String,
        #[serde(default)]
        wait_for_selector: Option<String>,
    },

    /// Evaluate a JavaScript expression in the page
    Evaluate {
        script: String,
    },

    /// Wait for an element to reach a state
    Wait {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
        #[serde(default)]
        state: WaitState,
    },

    /// Fill an input field
    Fill {
        selector: String,
        value: String,
    },

    /// Click an element
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Assert an attribute value of an element
    ExpectAttribute(AttributeCheck),

    /// Capture the page, or one element when a selector is given
    Screenshot {
        path: PathBuf,
        #[serde(default)]
        selector: Option<String>,
        #[serde(default)]
        full_page: bool,
    },

    /// Print a message to the transcript
    Log {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

/// (selector, attribute, expected value) triple checked against the live page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCheck {
    pub selector: String,
    pub attribute: String,
    pub expected: String,

    /// Prefix for the observed value in the transcript, e.g. "Initial type"
    #[serde(default)]
    pub label: Option<String>,

    /// Soft checks are reported but do not stop the scenario
    #[serde(default)]
    pub soft: bool,
}

impl AttributeCheck {
    pub fn new(
        selector: impl Into<String>,
        attribute: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            attribute: attribute.into(),
            expected: expected.into(),
            label: None,
            soft: false,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

impl Step {
    /// Short name used in logs and reports
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { url, .. } => format!("navigate:{}", url),
            Step::Evaluate { .. } => "evaluate".to_string(),
            Step::Wait { selector, .. } => format!("wait:{}", selector),
            Step::Fill { selector, .. } => format!("fill:{}", selector),
            Step::Click { selector, .. } => format!("click:{}", selector),
            Step::ExpectAttribute(check) => {
                format!("expect:{}[{}]", check.selector, check.attribute)
            }
            Step::Screenshot { path, .. } => format!("screenshot:{}", path.display()),
            Step::Log { message } => {
                let end = message
                    .char_indices()
                    .nth(30)
                    .map(|(i, _)| i)
                    .unwrap_or(message.len());
                format!("log:{}", &message[..end])
            }
        }
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> SmokeResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> SmokeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| match e {
            SmokeError::Yaml(err) => {
                SmokeError::ScenarioParse(format!("{}: {}", path.display(), err))
            }
            other => other,
        })
    }

    /// Load a single file, or every `.yaml`/`.yml` file under a directory
    pub fn load_all(path: &Path) -> SmokeResult<Vec<Self>> {
        if path.is_file() {
            return Ok(vec![Self::from_file(path)?]);
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        files.iter().map(|p| Self::from_file(p)).collect()
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Every screenshot path the scenario may write, error screenshot included
    pub fn screenshot_paths(&self) -> Vec<&Path> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::Screenshot { path, .. } => Some(path.as_path()),
                _ => None,
            })
            .chain(self.error_screenshot.as_deref())
            .collect()
    }

    fn validate(&self) -> SmokeResult<()> {
        if self.name.trim().is_empty() {
            return Err(SmokeError::ScenarioParse("scenario name is empty".into()));
        }
        if self.steps.is_empty() {
            return Err(SmokeError::ScenarioParse(format!(
                "scenario '{}' has no steps",
                self.name
            )));
        }
        Ok(())
    }
}

/// Resolve a step URL against the scenario base URL
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_scenario() {
        let yaml = r#"
name: login-toggle
description: Password visibility toggle
tags:
  - auth
  - smoke
error_screenshot: verification/error.png
steps:
  - action: navigate
    url: /login
    wait_for_selector: 'input[name="password"]'
  - action: fill
    selector: 'input[name="password"]'
    value: mysecretpassword
  - action: expect_attribute
    selector: 'input[name="password"]'
    attribute: type
    expected: password
    label: Initial type
  - action: screenshot
    path: verification/1_before_toggle.png
"#;
        let scenario = Scenario::from_yaml(yaml).unwrap();
        assert_eq!(scenario.name, "login-toggle");
        assert_eq!(scenario.base_url, "http://localhost:5173");
        assert_eq!(scenario.steps.len(), 4);
        assert_eq!(
            scenario.steps[2],
            Step::ExpectAttribute(
                AttributeCheck::new("input[name=\"password\"]", "type", "password")
                    .labeled("Initial type")
            )
        );
        assert_eq!(
            scenario.screenshot_paths(),
            vec![
                Path::new("verification/1_before_toggle.png"),
                Path::new("verification/error.png"),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_empty_steps() {
        let err = Scenario::from_yaml("name: empty\nsteps: []\n").unwrap_err();
        assert!(matches!(err, SmokeError::ScenarioParse(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let yaml = "name: bad\nsteps:\n  - action: teleport\n    to: mars\n";
        assert!(Scenario::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("http://localhost:5173/", "/admin/editor"),
            "http://localhost:5173/admin/editor"
        );
        assert_eq!(
            resolve_url("http://localhost:5173", "login"),
            "http://localhost:5173/login"
        );
        assert_eq!(
            resolve_url("http://localhost:5173", "https://example.com/x"),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_log_step_name_truncates_on_char_boundary() {
        let step = Step::Log {
            message: "é".repeat(40),
        };
        assert_eq!(step.name(), format!("log:{}", "é".repeat(30)));
    }
}
