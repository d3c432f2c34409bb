//! CLI Commands

pub mod browser;
pub mod upload;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use smokecheck_e2e::builtin::{EditorTarget, LoginTarget};
use smokecheck_e2e::{PlaywrightConfig, SuiteReport, UploadConfig, UploadReport};

use crate::output::{self, OutputFormat, SummaryRow};

/// Everything a command needs; defaults are the hard-coded targets
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub editor: EditorTarget,
    pub login: LoginTarget,
    pub upload: UploadConfig,
    pub playwright: PlaywrightConfig,
    /// Write a JSON report here after the run
    pub report: Option<PathBuf>,
    pub format: OutputFormat,
    /// Treat upload soft failures as a failed run
    pub strict: bool,
}

impl Settings {
    /// Point both browser scenarios at another origin
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.editor.base_url = url.clone();
        self.login.base_url = url;
        self
    }

    /// Put all screenshots under another directory
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.editor.screenshot = dir.join("verification.png");
        self.login.screenshot_dir = dir;
        self
    }
}

/// Combined report of an `all` run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub browser: SuiteReport,
    pub upload: UploadReport,
}

/// Run both browser scenarios, then the upload check
pub async fn run_all(settings: &Settings) -> anyhow::Result<bool> {
    let suite = browser::run_builtin(settings, &browser::all_builtin(settings)).await;
    let upload = upload::probe(settings).await?;

    let mut rows: Vec<SummaryRow> = suite
        .results
        .iter()
        .map(|r| SummaryRow {
            check: r.name.clone(),
            passed: r.success,
            duration_ms: Some(r.duration_ms),
            detail: r.error.clone().unwrap_or_else(|| {
                format!("{} checks, {} screenshots", r.checks.len(), r.evidence.len())
            }),
        })
        .collect();
    rows.push(SummaryRow {
        check: "upload".to_string(),
        passed: upload.outcome.is_success(),
        duration_ms: None,
        detail: upload.outcome.to_string(),
    });

    let report = RunReport {
        browser: suite,
        upload,
    };

    match settings.format {
        OutputFormat::Json => output::print_json(&report),
        format => {
            for line in report.upload.lines() {
                println!("{}", line);
            }
            output::print_list(&rows, format);
        }
    }
    if let Some(path) = &settings.report {
        write_report(path, &report)?;
    }

    Ok(report.browser.success() && upload_passed(&report.upload, settings.strict))
}

/// A failed upload only fails the run in strict mode
pub fn upload_passed(report: &UploadReport, strict: bool) -> bool {
    report.outcome.is_success() || !strict
}

/// Write any report as pretty JSON, creating parent directories
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!("Report written to: {}", path.display());
    Ok(())
}
