//! smokecheck CLI - Main Entry Point
//!
//! Runs the editor, login and upload smoke checks against a running
//! instance of the web application.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use smokecheck_cli::commands::{self, browser, upload};
use smokecheck_cli::output::OutputFormat;
use smokecheck_cli::{exit_code, logging, Settings};
use smokecheck_e2e::Browser;

/// smokecheck - browser and upload smoke checks
#[derive(Parser)]
#[command(name = "smokecheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Origin of the frontend under test
    #[arg(long, env = "SMOKECHECK_APP_URL", default_value = "http://localhost:5173", global = true)]
    app_url: String,

    /// Upload endpoint
    #[arg(
        long,
        env = "SMOKECHECK_UPLOAD_URL",
        default_value = "http://localhost:3000/api/upload",
        global = true
    )]
    upload_url: String,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium", global = true)]
    browser: Browser,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// Node.js executable
    #[arg(long, env = "SMOKECHECK_NODE", default_value = "node", global = true)]
    node: PathBuf,

    /// Directory where `playwright` is installed
    #[arg(long, default_value = ".", global = true)]
    work_dir: PathBuf,

    /// Default timeout for browser actions
    #[arg(long, default_value_t = 30_000, global = true)]
    timeout_ms: u64,

    /// Directory for screenshots
    #[arg(long, default_value = "verification", global = true)]
    out_dir: PathBuf,

    /// Write a JSON report to this file
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Exit non-zero when the upload check does not succeed
    #[arg(long, global = true)]
    strict: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify editor toolbar titles and keyboard shortcuts
    Editor,

    /// Verify the login password visibility toggle
    Login,

    /// Post a PNG to the upload endpoint
    Upload,

    /// Run every check and print a summary
    All,

    /// Run scenario files from a file or directory
    Run {
        /// Scenario file or directory of .yaml files
        path: PathBuf,

        /// Only run scenarios with this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Print the generated Playwright script for a scenario
    Script {
        /// Built-in scenario name or path to a scenario file
        name: String,
    },

    /// Check that node and playwright are installed
    Doctor,
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings::default()
            .with_app_url(self.app_url.clone())
            .with_screenshot_dir(self.out_dir.clone());

        settings.upload.endpoint = self.upload_url.clone();
        settings.playwright.node_binary = self.node.clone();
        settings.playwright.work_dir = self.work_dir.clone();
        settings.playwright.browser = self.browser;
        settings.playwright.headless = !self.headed;
        settings.playwright.timeout_ms = self.timeout_ms;
        settings.report = self.report.clone();
        settings.format = self.format;
        settings.strict = self.strict;
        settings
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = cli.settings();

    let result = match cli.command {
        Commands::Editor => {
            let scenario = smokecheck_e2e::builtin::editor_shortcuts(&settings.editor);
            browser::run_one(&settings, &scenario).await
        }
        Commands::Login => {
            let scenario = smokecheck_e2e::builtin::login_password_toggle(&settings.login);
            browser::run_one(&settings, &scenario).await
        }
        Commands::Upload => upload::execute(&settings).await,
        Commands::All => commands::run_all(&settings).await,
        Commands::Run { path, tag } => browser::run_files(&settings, &path, tag.as_deref()).await,
        Commands::Script { name } => browser::script(&settings, &name).map(|_| true),
        Commands::Doctor => browser::doctor(&settings).await,
    };

    exit_code(result)
}
