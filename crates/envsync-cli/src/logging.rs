//! Tracing subscriber setup for the binary

use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Parse a `--log-level` / `LOG_LEVEL` value.
///
/// Matching is case-insensitive. The level names used by Python tooling are
/// accepted too: `warning` maps to `warn`, `critical` and `fatal` to `error`.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    let normalized = level.trim().to_ascii_lowercase();
    let name = match normalized.as_str() {
        "warning" => "warn",
        "critical" | "fatal" => "error",
        other => other,
    };

    LevelFilter::from_str(name).map_err(|_| {
        CliError::startup(format!(
            "Invalid log level '{level}': expected one of \
             trace, debug, info, warning, error, critical or off"
        ))
    })
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `level` is used. The level is
/// validated even when `RUST_LOG` is set. Logs go to stderr; stdout carries
/// only command output.
pub fn init(level: &str) -> Result<()> {
    let level = parse_level(level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::startup(format!("Failed to install logging: {e}")))?;

    Ok(())
}
