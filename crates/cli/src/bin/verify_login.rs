//! Check the login password visibility toggle with default settings

use std::process::ExitCode;

use smokecheck_cli::{standalone, Check};

#[tokio::main]
async fn main() -> ExitCode {
    standalone(Check::Login).await
}
