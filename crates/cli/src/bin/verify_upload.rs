//! Check the upload endpoint with a 1x1 PNG with default settings

use std::process::ExitCode;

use smokecheck_cli::{standalone, Check};

#[tokio::main]
async fn main() -> ExitCode {
    standalone(Check::Upload).await
}
