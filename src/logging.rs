//! Tracing subscriber setup for the `gridscale` binary.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the log filter.
pub const LOG_ENV: &str = "GRIDSCALE_LOG";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive in [`LOG_ENV`] could not be parsed.
    #[error("invalid GRIDSCALE_LOG directive: {0}")]
    InvalidFilter(String),
    /// A global subscriber was already installed.
    #[error("failed to initialise tracing subscriber: {0}")]
    Init(String),
}

/// Default filter directive for a `-v` count.
#[must_use]
pub const fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a compact stderr subscriber. [`LOG_ENV`] takes precedence over
/// the verbosity derived default.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_logging(verbosity: u8) -> Result<(), LoggingError> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive)
            .map_err(|err| LoggingError::InvalidFilter(err.to_string()))?,
        _ => EnvFilter::new(default_directive(verbosity)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
