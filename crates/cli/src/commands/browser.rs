//! Browser scenario commands

use std::path::Path;

use anyhow::{bail, Context};
use tracing::{debug, info};

use smokecheck_e2e::builtin::{by_name, editor_shortcuts, login_password_toggle};
use smokecheck_e2e::{PlaywrightDriver, Scenario, ScenarioReport, ScenarioRunner, SuiteReport};

use super::{write_report, Settings};
use crate::output::{self, OutputFormat};

/// Both built-in scenarios against the configured targets
pub fn all_builtin(settings: &Settings) -> Vec<Scenario> {
    vec![
        editor_shortcuts(&settings.editor),
        login_password_toggle(&settings.login),
    ]
}

/// Look up a built-in scenario by name against the configured targets
pub fn builtin(settings: &Settings, name: &str) -> Option<Scenario> {
    by_name(name, &settings.editor, &settings.login)
}

/// Run scenarios without printing anything
pub async fn run_builtin(settings: &Settings, scenarios: &[Scenario]) -> SuiteReport {
    ScenarioRunner::new(settings.playwright.clone())
        .run_all(scenarios)
        .await
}

/// Run one scenario and print its transcript
pub async fn run_one(settings: &Settings, scenario: &Scenario) -> anyhow::Result<bool> {
    let suite = run_builtin(settings, std::slice::from_ref(scenario)).await;
    finish(settings, suite)
}

/// Run every scenario file under `path`, optionally only those with `tag`
pub async fn run_files(settings: &Settings, path: &Path, tag: Option<&str>) -> anyhow::Result<bool> {
    let scenarios = Scenario::load_all(path)
        .with_context(|| format!("Failed to load scenarios from {}", path.display()))?;

    let selected: Vec<Scenario> = match tag {
        Some(tag) => Scenario::filter_by_tag(&scenarios, tag)
            .into_iter()
            .cloned()
            .collect(),
        None => scenarios,
    };
    if selected.is_empty() {
        bail!("No scenarios found in {}", path.display());
    }
    info!("Loaded {} scenario(s) from {}", selected.len(), path.display());

    let suite = run_builtin(settings, &selected).await;
    finish(settings, suite)
}

/// Print the generated Playwright script for a built-in scenario or a file
pub fn script(settings: &Settings, name: &str) -> anyhow::Result<()> {
    let scenario = match builtin(settings, name) {
        Some(scenario) => scenario,
        None => Scenario::from_file(Path::new(name))
            .with_context(|| format!("'{}' is neither a built-in scenario nor a file", name))?,
    };
    let driver = PlaywrightDriver::new(settings.playwright.clone());
    print!("{}", driver.build_script(&scenario));
    Ok(())
}

/// Check that node and the playwright module are usable
pub async fn doctor(settings: &Settings) -> anyhow::Result<bool> {
    let driver = PlaywrightDriver::new(settings.playwright.clone());
    let config = driver.config();
    debug!(
        "node={} work_dir={}",
        config.node_binary.display(),
        config.work_dir.display()
    );

    match driver.check_installed().await {
        Ok(()) => {
            output::print_success(&format!(
                "playwright is available ({} via {})",
                config.browser.as_str(),
                config.node_binary.display()
            ));
            Ok(true)
        }
        Err(e) => {
            output::print_error(&e.to_string());
            output::print_warning("Install it with: npm install playwright && npx playwright install");
            Ok(false)
        }
    }
}

fn finish(settings: &Settings, suite: SuiteReport) -> anyhow::Result<bool> {
    match settings.format {
        OutputFormat::Json => output::print_json(&suite),
        _ => suite.results.iter().for_each(print_report),
    }
    if let Some(path) = &settings.report {
        write_report(path, &suite)?;
    }
    Ok(suite.success())
}

fn print_report(report: &ScenarioReport) {
    for line in &report.transcript {
        println!("{}", line);
    }
    match &report.error {
        None => output::print_success(&format!("{}: verification complete", report.name)),
        Some(error) => output::print_error(&format!("{}: {}", report.name, error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smokecheck_e2e::builtin::{EDITOR_SHORTCUTS, LOGIN_PASSWORD_TOGGLE};

    #[test]
    fn test_builtin_follows_settings() {
        let settings = Settings::default().with_app_url("http://127.0.0.1:9999");

        let editor = builtin(&settings, "editor").unwrap();
        assert_eq!(editor.name, EDITOR_SHORTCUTS);
        assert_eq!(editor.base_url, "http://127.0.0.1:9999");

        let login = builtin(&settings, LOGIN_PASSWORD_TOGGLE).unwrap();
        assert_eq!(login.base_url, "http://127.0.0.1:9999");

        assert!(builtin(&settings, "checkout").is_none());
    }

    #[test]
    fn test_all_builtin_order() {
        let names: Vec<String> = all_builtin(&Settings::default())
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec![EDITOR_SHORTCUTS, LOGIN_PASSWORD_TOGGLE]);
    }

    #[tokio::test]
    async fn test_run_files_rejects_unmatched_tag() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.yaml"),
            "name: a\ntags: [auth]\nsteps:\n  - action: log\n    message: hi\n",
        )
        .unwrap();

        let err = run_files(&Settings::default(), dir.path(), Some("search"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No scenarios found"));
    }
}
