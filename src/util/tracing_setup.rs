//! Tracing/logging initialization

use anyhow::{anyhow, bail, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber described by `config`.
///
/// `RUST_LOG` wins over the configured level. Fails on an unknown format or
/// when a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    // Thread ids matter: connecting is bound to worker threads
    let installed = match config.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_thread_ids(true),
            )
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().with_thread_ids(true).with_thread_names(true))
            .try_init(),
        other => bail!("Unknown log format: {:?}", other),
    };

    installed.map_err(|e| anyhow!("Tracing subscriber already installed: {}", e))
}
