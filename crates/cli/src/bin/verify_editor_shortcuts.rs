//! Check the editor toolbar titles and keyboard shortcuts with default settings

use std::process::ExitCode;

use smokecheck_cli::{standalone, Check};

#[tokio::main]
async fn main() -> ExitCode {
    standalone(Check::Editor).await
}
