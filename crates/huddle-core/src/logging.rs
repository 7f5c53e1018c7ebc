//! `tracing` subscriber installation.
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity for one module without editing settings.

use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter {
        /// Directive as configured.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Parse a filter directive such as `info` or `huddle_server=debug,info`.
pub fn filter_from(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_owned(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// Uses `RUST_LOG` when set, otherwise `level`. With `json` the output is one
/// JSON object per line.
pub fn init_subscriber(level: &str, json: bool) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_from(level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;
    debug!(level, json, "tracing subscriber installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn plain_level_parses() {
        let filter = filter_from("debug").unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn per_target_directives_parse() {
        let filter = filter_from("huddle_server=trace,warn").unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("huddle_server=trace"));
        assert!(rendered.contains("warn"));
    }

    #[test]
    fn invalid_level_is_rejected() {
        let err = filter_from("huddle_server=loud").unwrap_err();
        assert!(err.to_string().contains("huddle_server=loud"));
    }

    #[test]
    fn installs_once_then_reports_already_installed() {
        // The only test in this crate that touches the global subscriber.
        assert!(init_subscriber("debug", false).is_ok());
        assert_matches!(
            init_subscriber("debug", true),
            Err(LoggingError::AlreadyInstalled(_))
        );
    }
}
