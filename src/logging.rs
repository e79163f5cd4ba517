//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Applications that want them
//! printed can install a subscriber with [`init_logging`] (feature `logging`).

use crate::config::LoggingConfig;
use crate::error::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global `fmt` subscriber configured from `config`
///
/// `RUST_LOG` takes precedence over `config.level` when set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Error> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = fmt().with_env_filter(env_filter).with_target(true);

    let result = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        _ => builder.compact().try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to install tracing subscriber: {}", e)))
}
