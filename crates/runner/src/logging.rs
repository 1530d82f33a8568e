//! Diagnostics setup
//!
//! Everything goes to stderr: stdout belongs to job output and command results.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "stepexec=info";

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default filter; `format` is `json` or anything
/// else for human-readable output.
pub fn init(format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| anyhow!("Failed to create env filter: {}", e))?;

    match format {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    }
    .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}
