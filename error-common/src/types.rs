use thiserror::Error;

use crate::codes::{Classify, ErrorKind};

/// Top-level error for process wiring (startup, configuration, serving)
#[derive(Error, Debug)]
pub enum WardCareError {
    /// Database operation errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl Classify for WardCareError {
    fn kind(&self) -> ErrorKind {
        match self {
            WardCareError::ConfigError(_) => ErrorKind::Configuration,
            _ => ErrorKind::RemotePersistenceFailure,
        }
    }
}

/// Result type alias for WardCare process wiring
pub type Result<T> = std::result::Result<T, WardCareError>;

/// Log an error with its classification
pub fn log_error<E>(context: &str, error: &E)
where
    E: Classify + std::fmt::Display,
{
    let kind = error.kind();
    tracing::error!(
        context = context,
        error_kind = %kind,
        error_code = kind.code(),
        error = %error,
        "WardCare error occurred"
    );
}
