//! Playwright browser automation
//!
//! A scenario is compiled into one Node.js script that launches the browser,
//! runs every step against a single page and always closes the browser. The
//! script reports progress as prefixed JSON lines on stdout, which are parsed
//! back into [`ScriptEvent`]s.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{SmokeError, SmokeResult};
use crate::scenario::{resolve_url, AttributeCheck, Scenario, Step};

/// Prefix marking a structured event line in the script's stdout
pub const EVENT_PREFIX: &str = "@@smokecheck ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = SmokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(SmokeError::ScenarioParse(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    /// Node.js executable used to run generated scripts
    pub node_binary: PathBuf,

    /// Directory the script runs in; relative screenshot paths land here
    pub work_dir: PathBuf,

    pub browser: Browser,
    pub headless: bool,

    /// Default timeout for waits, clicks and attribute checks
    pub timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            node_binary: PathBuf::from("node"),
            work_dir: PathBuf::from("."),
            browser: Browser::Chromium,
            headless: true,
            timeout_ms: 30_000,
        }
    }
}

/// One structured progress line reported by a running script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// A step completed
    Step { index: usize, name: String },

    /// An attribute check was evaluated
    Check {
        index: usize,
        selector: String,
        attribute: String,
        expected: String,
        actual: Option<String>,
        passed: bool,
        #[serde(default)]
        soft: bool,
        #[serde(default)]
        label: Option<String>,
    },

    /// A `log` step, or a note from the script itself
    Log {
        index: Option<usize>,
        message: String,
    },

    /// A screenshot file was written
    Screenshot { index: Option<usize>, path: PathBuf },

    /// A step threw; the scenario stopped here
    Error {
        index: Option<usize>,
        message: String,
    },
}

/// Raw result of running one generated script
#[derive(Debug, Clone)]
pub struct ScriptRun {
    pub events: Vec<ScriptEvent>,
    pub exit_success: bool,
    pub stderr: String,
}

/// Playwright browser handle
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
}

impl PlaywrightDriver {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// Check that node runs and can resolve the `playwright` module
    pub async fn check_installed(&self) -> SmokeResult<()> {
        let status = Command::new(&self.config.node_binary)
            .args(["-e", "require.resolve('playwright')"])
            .current_dir(&self.config.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(())
        } else {
            Err(SmokeError::PlaywrightNotFound)
        }
    }

    /// Resolve a screenshot path against the working directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.work_dir.join(path)
        }
    }

    /// Build the Playwright script for a scenario
    pub fn build_script(&self, scenario: &Scenario) -> String {
        let mut script = String::new();

        // Header
        let _ = write!(
            script,
            r#"const {{ chromium, firefox, webkit }} = require('playwright');

const emit = (event) => console.log({prefix} + JSON.stringify(event));

async function settledAttribute(locator, name, expected, timeout) {{
  const deadline = Date.now() + timeout;
  let actual = await locator.getAttribute(name, {{ timeout }});
  while (actual !== expected && Date.now() < deadline) {{
    await new Promise((resolve) => setTimeout(resolve, 100));
    actual = await locator.getAttribute(name, {{ timeout }});
  }}
  return actual;
}}

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({timeout});
  let index = null;

  try {{
"#,
            prefix = js(EVENT_PREFIX),
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            width = scenario.viewport.width,
            height = scenario.viewport.height,
            timeout = self.config.timeout_ms,
        );

        for (i, step) in scenario.steps.iter().enumerate() {
            let _ = writeln!(script, "\n    // Step {}: {}", i + 1, step.name());
            let _ = writeln!(script, "    index = {};", i);
            script.push_str(&self.step_to_js(scenario, step, i));
            let _ = writeln!(
                script,
                "    emit({{ event: 'step', index: {}, name: {} }});",
                i,
                js(&step.name())
            );
        }

        // Footer
        script.push_str(
            r#"  } catch (error) {
    emit({ event: 'error', index, message: String(error && error.message ? error.message : error) });
"#,
        );
        if let Some(path) = &scenario.error_screenshot {
            let path = js(&self.resolve_path(path).to_string_lossy());
            let _ = write!(
                script,
                r#"    try {{
      await page.screenshot({{ path: {path} }});
      emit({{ event: 'screenshot', index, path: {path} }});
    }} catch (screenshotError) {{
      emit({{ event: 'log', index, message: 'error screenshot failed: ' + screenshotError.message }});
    }}
"#,
                path = path
            );
        }
        script.push_str(
            r#"    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, scenario: &Scenario, step: &Step, index: usize) -> String {
        let timeout = self.config.timeout_ms;
        match step {
            Step::Navigate { url, wait_for_selector } => {
                let mut code = format!(
                    "    await page.goto({});\n",
                    js(&resolve_url(&scenario.base_url, url))
                );
                if let Some(selector) = wait_for_selector {
                    let _ = writeln!(code, "    await page.waitForSelector({});", js(selector));
                }
                code
            }
            Step::Evaluate { script } => {
                format!("    await page.evaluate({});\n", js(script))
            }
            Step::Wait { selector, timeout_ms, state } => format!(
                "    await page.waitForSelector({}, {{ state: '{}', timeout: {} }});\n",
                js(selector),
                state.as_str(),
                timeout_ms.unwrap_or(timeout)
            ),
            Step::Fill { selector, value } => {
                format!("    await page.fill({}, {});\n", js(selector), js(value))
            }
            Step::Click { selector, timeout_ms } => format!(
                "    await page.locator({}).click({{ timeout: {} }});\n",
                js(selector),
                timeout_ms.unwrap_or(timeout)
            ),
            Step::ExpectAttribute(check) => check_to_js(check, index, timeout),
            Step::Screenshot { path, selector, full_page } => {
                let path = js(&self.resolve_path(path).to_string_lossy());
                let capture = match selector {
                    Some(sel) => format!(
                        "    await page.locator({}).screenshot({{ path: {} }});\n",
                        js(sel),
                        path
                    ),
                    None => format!(
                        "    await page.screenshot({{ path: {}, fullPage: {} }});\n",
                        path, full_page
                    ),
                };
                format!(
                    "{}    emit({{ event: 'screenshot', index: {}, path: {} }});\n",
                    capture, index, path
                )
            }
            Step::Log { message } => format!(
                "    emit({{ event: 'log', index: {}, message: {} }});\n",
                index,
                js(message)
            ),
        }
    }

    /// Run a scenario's script and collect its events
    pub async fn run(&self, scenario: &Scenario) -> SmokeResult<ScriptRun> {
        for path in scenario.screenshot_paths() {
            if let Some(parent) = self.resolve_path(path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let script = self.build_script(scenario);
        debug!("Running Playwright script for '{}' ({} bytes)", scenario.name, script.len());
        self.run_script(&script).await
    }

    /// Pipe a script into `node -` and parse what it reports
    pub async fn run_script(&self, script: &str) -> SmokeResult<ScriptRun> {
        let mut child = Command::new(&self.config.node_binary)
            .arg("-")
            .current_dir(&self.config.work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if stderr.contains("Cannot find module 'playwright'") {
            return Err(SmokeError::PlaywrightNotFound);
        }

        let events = parse_events(&stdout);
        let exit_success = output.status.success();

        if !exit_success && !events.iter().any(|e| matches!(e, ScriptEvent::Error { .. })) {
            return Err(SmokeError::Playwright(format!(
                "Script failed ({}):\nstdout: {}\nstderr: {}",
                output.status, stdout, stderr
            )));
        }

        if !stderr.trim().is_empty() {
            warn!("Playwright stderr: {}", stderr.trim());
        }
        info!("Script finished with {} event(s)", events.len());

        Ok(ScriptRun {
            events,
            exit_success,
            stderr,
        })
    }

    fn spawn_error(&self, e: std::io::Error) -> SmokeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            SmokeError::NodeNotFound(self.config.node_binary.display().to_string())
        } else {
            SmokeError::Io(e)
        }
    }
}

fn check_to_js(check: &AttributeCheck, index: usize, timeout: u64) -> String {
    let selector = js(&check.selector);
    let attribute = js(&check.attribute);
    let expected = js(&check.expected);
    let label = check.label.as_deref().map(js).unwrap_or_else(|| "null".to_string());

    let mut code = format!(
        r#"    {{
      const actual = await settledAttribute(page.locator({selector}), {attribute}, {expected}, {timeout});
      const passed = actual === {expected};
      emit({{ event: 'check', index: {index}, selector: {selector}, attribute: {attribute}, expected: {expected}, actual, passed, soft: {soft}, label: {label} }});
"#,
        selector = selector,
        attribute = attribute,
        expected = expected,
        timeout = timeout,
        index = index,
        soft = check.soft,
        label = label,
    );
    if !check.soft {
        let _ = write!(
            code,
            r#"      if (!passed) {{
        throw new Error({attribute} + ' of ' + {selector} + ': expected ' + JSON.stringify({expected}) + ', got ' + JSON.stringify(actual));
      }}
"#,
            attribute = attribute,
            selector = selector,
            expected = expected,
        );
    }
    code.push_str("    }\n");
    code
}

/// Embed a string as a JavaScript string literal
fn js(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Extract structured events from script stdout; other lines are logged
pub fn parse_events(stdout: &str) -> Vec<ScriptEvent> {
    let mut events = Vec::new();
    for line in stdout.lines() {
        match line.strip_prefix(EVENT_PREFIX) {
            Some(payload) => match serde_json::from_str::<ScriptEvent>(payload) {
                Ok(event) => events.push(event),
                Err(e) => warn!("Unparseable script event ({}): {}", e, payload),
            },
            None if !line.trim().is_empty() => debug!("[script] {}", line),
            None => {}
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Viewport;

    fn scenario(steps: Vec<Step>) -> Scenario {
        Scenario {
            name: "unit".to_string(),
            description: String::new(),
            tags: vec![],
            base_url: "http://localhost:5173".to_string(),
            viewport: Viewport { width: 800, height: 600 },
            steps,
            error_screenshot: None,
        }
    }

    fn driver() -> PlaywrightDriver {
        PlaywrightDriver::new(PlaywrightConfig {
            work_dir: PathBuf::from("/tmp/smoke"),
            ..Default::default()
        })
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("Firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("lynx".parse::<Browser>().is_err());
    }

    #[test]
    fn test_script_header_uses_config() {
        let mut config = PlaywrightConfig::default();
        config.browser = Browser::Webkit;
        config.headless = false;
        let script = PlaywrightDriver::new(config).build_script(&scenario(vec![Step::Log {
            message: "hi".into(),
        }]));

        assert!(script.contains("await webkit.launch({ headless: false })"));
        assert!(script.contains("viewport: { width: 800, height: 600 }"));
        assert!(script.contains("page.setDefaultTimeout(30000)"));
        assert!(script.contains("await browser.close();"));
    }

    #[test]
    fn test_navigate_resolves_against_base_url() {
        let script = driver().build_script(&scenario(vec![Step::Navigate {
            url: "/admin/editor".into(),
            wait_for_selector: Some(".ProseMirror".into()),
        }]));

        assert!(script.contains(r#"await page.goto("http://localhost:5173/admin/editor");"#));
        assert!(script.contains(r#"await page.waitForSelector(".ProseMirror");"#));
    }

    #[test]
    fn test_selectors_are_escaped() {
        let script = driver().build_script(&scenario(vec![Step::Fill {
            selector: r#"input[name="password"]"#.into(),
            value: "it's".into(),
        }]));

        assert!(script.contains(r#"await page.fill("input[name=\"password\"]", "it's");"#));
    }

    #[test]
    fn test_hard_check_throws_and_soft_check_does_not() {
        let hard = AttributeCheck::new("button[title*='Bold']", "title", "Bold (Cmd/Ctrl+B)");
        let mut soft = hard.clone();
        soft.soft = true;

        let hard_js = driver().build_script(&scenario(vec![Step::ExpectAttribute(hard)]));
        let soft_js = driver().build_script(&scenario(vec![Step::ExpectAttribute(soft)]));

        assert!(hard_js.contains("throw new Error("));
        assert!(hard_js.contains(r#""Bold (Cmd/Ctrl+B)""#));
        assert!(!soft_js.contains("throw new Error("));
        assert!(soft_js.contains("soft: true"));
    }

    #[test]
    fn test_screenshot_paths_resolved_against_work_dir() {
        let mut sc = scenario(vec![Step::Screenshot {
            path: PathBuf::from("verification/verification.png"),
            selector: Some("button[title*='Bold'] >> xpath=..".into()),
            full_page: false,
        }]);
        sc.error_screenshot = Some(PathBuf::from("verification/error.png"));
        let script = driver().build_script(&sc);

        assert!(script.contains(
            r#"await page.locator("button[title*='Bold'] >> xpath=..").screenshot({ path: "/tmp/smoke/verification/verification.png" });"#
        ));
        assert!(script.contains(r#"await page.screenshot({ path: "/tmp/smoke/verification/error.png" });"#));
    }

    #[test]
    fn test_parse_events_skips_noise() {
        let stdout = concat!(
            "some console noise\n",
            "@@smokecheck {\"event\":\"step\",\"index\":0,\"name\":\"navigate:/login\"}\n",
            "@@smokecheck {\"event\":\"check\",\"index\":1,\"selector\":\"input\",\"attribute\":\"type\",\"expected\":\"password\",\"actual\":null,\"passed\":false}\n",
            "@@smokecheck not json\n",
            "@@smokecheck {\"event\":\"error\",\"index\":1,\"message\":\"boom\"}\n",
        );
        let events = parse_events(stdout);

        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ScriptEvent::Step {
                index: 0,
                name: "navigate:/login".into()
            }
        );
        match &events[1] {
            ScriptEvent::Check { actual, passed, soft, label, .. } => {
                assert_eq!(actual, &None);
                assert!(!passed);
                assert!(!soft);
                assert_eq!(label, &None);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(&events[2], ScriptEvent::Error { index: Some(1), .. }));
    }
}
