//! Logging bootstrap for binaries and tests embedding the presale.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("subscriber init failed: {0}")]
    Init(String),
}

/// Install a global fmt subscriber filtered by `filter` (RUST_LOG-style directives,
/// typically `telemetry.log_filter` from [`crate::config::load`]).
pub fn init_tracing(filter: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}
