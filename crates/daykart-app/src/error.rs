//! DayKart application error types.

use daykart_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the storefront application.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A storefront operation or the backing store failed.
    #[error("storefront error: {0}")]
    Storage(#[from] DomainError),

    /// The log subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// File system or runtime I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_converts_into_storage_variant() {
        let err: AppError = DomainError::ProductNotFound(9).into();

        assert!(matches!(err, AppError::Storage(DomainError::ProductNotFound(9))));
        assert_eq!(err.to_string(), "storefront error: product not found: 9");
    }

    #[test]
    fn test_config_error_message() {
        let err = AppError::Config("DAYKART_MIRROR_CAPACITY must be at least 1".to_owned());

        assert_eq!(
            err.to_string(),
            "configuration error: DAYKART_MIRROR_CAPACITY must be at least 1"
        );
    }
}
