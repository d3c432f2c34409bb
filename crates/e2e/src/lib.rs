//! smokecheck E2E framework
//!
//! Browser and HTTP smoke checks against a running instance of the web
//! application:
//! - Compiles declarative scenarios into Playwright scripts and runs them
//!   through Node.js, one browser per scenario
//! - Collects attribute checks, transcript lines and screenshot evidence
//! - Posts a hand-built multipart upload and classifies the response
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  smokecheck E2E (Rust)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioRunner                                             │
//! │    ├── PlaywrightDriver::build_script(scenario) -> JS       │
//! │    ├── PlaywrightDriver::run(scenario) -> ScriptRun         │
//! │    └── build_report(scenario, run) -> ScenarioReport        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML or builtin)                                 │
//! │    ├── navigate { url, wait_for_selector? }                 │
//! │    ├── evaluate { script }                                  │
//! │    ├── wait / fill / click                                  │
//! │    ├── expect_attribute { selector, attribute, expected }   │
//! │    ├── screenshot { path, selector? }                       │
//! │    └── log { message }                                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UploadProbe                                                │
//! │    └── PNG fixture -> MultipartBody -> POST -> UploadReport │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod builtin;
pub mod error;
pub mod fixture;
pub mod multipart;
pub mod playwright;
pub mod runner;
pub mod scenario;
pub mod upload;

pub use error::{SmokeError, SmokeResult};
pub use playwright::{Browser, PlaywrightConfig, PlaywrightDriver};
pub use runner::{ScenarioReport, ScenarioRunner, SuiteReport};
pub use scenario::{AttributeCheck, Scenario, Step};
pub use upload::{UploadConfig, UploadOutcome, UploadProbe, UploadReport};
