//! smokecheck CLI library
//!
//! Shared pieces of the `smokecheck` binary and the three single-purpose
//! `verify-*` binaries.

pub mod commands;
pub mod logging;
pub mod output;

use std::process::ExitCode;

pub use commands::Settings;

/// Which check a no-argument binary runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Editor,
    Login,
    Upload,
}

/// Run one check with default settings, as the `verify-*` binaries do
pub async fn standalone(check: Check) -> ExitCode {
    logging::init(false);
    let settings = Settings::default();

    let result = match check {
        Check::Editor => {
            let scenario = smokecheck_e2e::builtin::editor_shortcuts(&settings.editor);
            commands::browser::run_one(&settings, &scenario).await
        }
        Check::Login => {
            let scenario = smokecheck_e2e::builtin::login_password_toggle(&settings.login);
            commands::browser::run_one(&settings, &scenario).await
        }
        Check::Upload => commands::upload::execute(&settings).await,
    };

    exit_code(result)
}

/// Map a command result onto the process exit status
pub fn exit_code(result: anyhow::Result<bool>) -> ExitCode {
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
