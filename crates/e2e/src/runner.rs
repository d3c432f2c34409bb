//! Scenario runner: drives Playwright and turns script events into reports

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{SmokeError, SmokeResult};
use crate::playwright::{PlaywrightConfig, PlaywrightDriver, ScriptEvent, ScriptRun};
use crate::scenario::Scenario;

/// Outcome of one attribute check as observed in the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub step: usize,
    pub selector: String,
    pub attribute: String,
    pub expected: String,
    pub actual: Option<String>,
    pub passed: bool,
    pub soft: bool,
    pub label: Option<String>,
}

/// A screenshot written during the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps_completed: usize,
    pub steps_total: usize,
    pub checks: Vec<CheckOutcome>,
    pub evidence: Vec<Evidence>,
    pub transcript: Vec<String>,
    pub error: Option<String>,
}

impl ScenarioReport {
    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Result of running several scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios one after another, each in its own browser
pub struct ScenarioRunner {
    driver: PlaywrightDriver,
}

impl ScenarioRunner {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self {
            driver: PlaywrightDriver::new(config),
        }
    }

    pub fn driver(&self) -> &PlaywrightDriver {
        &self.driver
    }

    /// Run a single scenario
    pub async fn run(&self, scenario: &Scenario) -> SmokeResult<ScenarioReport> {
        let start = Instant::now();
        info!("Running scenario: {}", scenario.name);

        let run = self.driver.run(scenario).await?;
        let mut report = build_report(scenario, &run);
        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.success {
            info!("✓ {} ({} ms)", report.name, report.duration_ms);
        } else {
            error!(
                "✗ {} - {}",
                report.name,
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(report)
    }

    /// Run a list of scenarios; infrastructure errors fail that scenario only
    pub async fn run_all(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(scenarios.len());

        info!("Running {} scenario(s)...", scenarios.len());

        for scenario in scenarios {
            let report = match self.run(scenario).await {
                Ok(report) => report,
                Err(e) => {
                    error!("✗ {} - {}", scenario.name, e);
                    ScenarioReport {
                        name: scenario.name.clone(),
                        success: false,
                        duration_ms: 0,
                        steps_completed: 0,
                        steps_total: scenario.steps.len(),
                        checks: vec![],
                        evidence: vec![],
                        transcript: vec![],
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(report);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        SuiteReport {
            started_at,
            total: results.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }
}

/// Fold the script's events into a report
pub fn build_report(scenario: &Scenario, run: &ScriptRun) -> ScenarioReport {
    let mut checks = Vec::new();
    let mut evidence = Vec::new();
    let mut transcript = Vec::new();
    let mut steps_completed = 0;
    let mut script_error: Option<(Option<usize>, String)> = None;

    for event in &run.events {
        match event {
            ScriptEvent::Step { index, name } => {
                debug!("step {} done: {}", index, name);
                steps_completed += 1;
            }
            ScriptEvent::Check {
                index,
                selector,
                attribute,
                expected,
                actual,
                passed,
                soft,
                label,
            } => {
                let shown = actual.as_deref().unwrap_or("<missing>");
                transcript.push(match label {
                    Some(label) => format!("{}: {}", label, shown),
                    None => format!(
                        "{} {} {}: {}",
                        if *passed { "ok" } else { "MISMATCH" },
                        selector,
                        attribute,
                        shown
                    ),
                });
                if !passed && *soft {
                    warn!("soft check failed: {} of {}", attribute, selector);
                }
                checks.push(CheckOutcome {
                    step: *index,
                    selector: selector.clone(),
                    attribute: attribute.clone(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                    passed: *passed,
                    soft: *soft,
                    label: label.clone(),
                });
            }
            ScriptEvent::Log { message, .. } => transcript.push(message.clone()),
            ScriptEvent::Screenshot { path, .. } => match hash_file(path) {
                Ok(item) => evidence.push(item),
                Err(e) => warn!("Screenshot {} not readable: {}", path.display(), e),
            },
            ScriptEvent::Error { index, message } => {
                transcript.push(format!("Error: {}", message));
                if script_error.is_none() {
                    script_error = Some((*index, message.clone()));
                }
            }
        }
    }

    let hard_failure = checks.iter().find(|c| !c.passed && !c.soft);
    let error = match (hard_failure, script_error) {
        (Some(check), _) => Some(
            SmokeError::CheckFailed {
                selector: check.selector.clone(),
                attribute: check.attribute.clone(),
                expected: check.expected.clone(),
                actual: check.actual.clone(),
            }
            .to_string(),
        ),
        (None, Some((index, reason))) => {
            let step = index
                .and_then(|i| scenario.steps.get(i))
                .map(|s| s.name())
                .unwrap_or_else(|| "setup".to_string());
            Some(SmokeError::StepFailed { step, reason }.to_string())
        }
        (None, None) if !run.exit_success => Some(match last_line(&run.stderr) {
            Some(line) => format!("script exited with failure: {}", line),
            None => "script exited with failure".to_string(),
        }),
        (None, None) if steps_completed < scenario.steps.len() => Some(format!(
            "script stopped after {} of {} steps",
            steps_completed,
            scenario.steps.len()
        )),
        (None, None) => None,
    };

    ScenarioReport {
        name: scenario.name.clone(),
        success: error.is_none(),
        duration_ms: 0,
        steps_completed,
        steps_total: scenario.steps.len(),
        checks,
        evidence,
        transcript,
        error,
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// Size and SHA-256 of a written screenshot
fn hash_file(path: &Path) -> SmokeResult<Evidence> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(Evidence {
        path: path.to_path_buf(),
        bytes: data.len() as u64,
        sha256: hex::encode(hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{login_password_toggle, LoginTarget};

    fn check_event(index: usize, expected: &str, actual: &str, label: &str) -> ScriptEvent {
        ScriptEvent::Check {
            index,
            selector: r#"input[name="password"]"#.into(),
            attribute: "type".into(),
            expected: expected.into(),
            actual: Some(actual.into()),
            passed: expected == actual,
            soft: false,
            label: Some(label.into()),
        }
    }

    fn steps_done(scenario: &Scenario, upto: usize) -> Vec<ScriptEvent> {
        scenario.steps[..upto]
            .iter()
            .enumerate()
            .map(|(index, s)| ScriptEvent::Step { index, name: s.name() })
            .collect()
    }

    #[test]
    fn test_report_for_clean_run() {
        let scenario = login_password_toggle(&LoginTarget::default());
        let mut events = steps_done(&scenario, scenario.steps.len());
        events.insert(2, check_event(2, "password", "password", "Initial type"));

        let report = build_report(
            &scenario,
            &ScriptRun { events, exit_success: true, stderr: String::new() },
        );

        assert!(report.success);
        assert_eq!(report.steps_completed, 9);
        assert_eq!(report.transcript, vec!["Initial type: password"]);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_report_for_failed_hard_check() {
        let scenario = login_password_toggle(&LoginTarget::default());
        let mut events = steps_done(&scenario, 5);
        events.push(check_event(5, "text", "password", "Toggled type"));
        events.push(ScriptEvent::Error { index: Some(5), message: "type mismatch".into() });

        let report = build_report(
            &scenario,
            &ScriptRun { events, exit_success: false, stderr: String::new() },
        );

        assert!(!report.success);
        assert_eq!(report.failed_checks().count(), 1);
        let error = report.error.unwrap();
        assert!(error.contains("expected \"text\""), "{}", error);
        assert_eq!(report.transcript[0], "Toggled type: password");
    }

    #[test]
    fn test_report_for_step_error_names_the_step() {
        let scenario = login_password_toggle(&LoginTarget::default());
        let mut events = steps_done(&scenario, 4);
        events.push(ScriptEvent::Error {
            index: Some(4),
            message: "Timeout 30000ms exceeded".into(),
        });

        let report = build_report(
            &scenario,
            &ScriptRun { events, exit_success: false, stderr: String::new() },
        );

        assert_eq!(
            report.error.as_deref(),
            Some(r#"Step failed: click:button[aria-label="Show password"] - Timeout 30000ms exceeded"#)
        );
    }

    #[test]
    fn test_report_for_truncated_run() {
        let scenario = login_password_toggle(&LoginTarget::default());
        let report = build_report(
            &scenario,
            &ScriptRun {
                events: steps_done(&scenario, 3),
                exit_success: true,
                stderr: String::new(),
            },
        );
        assert_eq!(report.error.as_deref(), Some("script stopped after 3 of 9 steps"));
    }

    #[test]
    fn test_report_for_failed_exit_carries_stderr() {
        let scenario = login_password_toggle(&LoginTarget::default());
        let report = build_report(
            &scenario,
            &ScriptRun {
                events: steps_done(&scenario, scenario.steps.len()),
                exit_success: false,
                stderr: "(node:42) Warning: something\nbrowserType.launch: Executable doesn't exist\n\n".into(),
            },
        );

        assert!(!report.success);
        assert_eq!(
            report.error.as_deref(),
            Some("script exited with failure: browserType.launch: Executable doesn't exist")
        );
    }

    #[test]
    fn test_screenshot_evidence_is_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"abc").unwrap();

        let evidence = hash_file(&path).unwrap();
        assert_eq!(evidence.bytes, 3);
        assert_eq!(
            evidence.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
