//! Tracing setup shared by every binary

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber; `RUST_LOG` wins over `verbose`
pub fn init(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
