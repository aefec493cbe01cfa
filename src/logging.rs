//! Log output setup.
//!
//! Logs go to stderr so stdout stays reserved for command output. `RUST_LOG`
//! overrides the default filter.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";
/// Default filter for `--verbose`.
pub const VERBOSE_FILTER: &str = "folio=debug,tower_http=debug,info";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber.
pub fn init(verbose: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
