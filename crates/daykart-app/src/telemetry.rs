//! Log subscriber setup.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::error::AppError;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global `tracing` subscriber. `RUST_LOG` selects the filter,
/// `format` the output.
///
/// # Errors
///
/// Returns `AppError::Telemetry` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => subscriber
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_target(false))
            .try_init(),
    };
    result.map_err(|e| AppError::Telemetry(e.to_string()))
}
