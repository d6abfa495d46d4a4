use billing_service::BillingError;
use database_layer::{DatabaseError, StatePatch};
use error_common::{Classify, ErrorKind, ValidationFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

impl WardError {
    /// Writes that landed before a best-effort operation failed
    pub fn partial_patch(&self) -> Option<&StatePatch> {
        match self {
            WardError::Database(err) => err.partial_patch(),
            WardError::Billing(err) => err.partial_patch(),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for WardError {
    fn from(err: ValidationFailure) -> Self {
        WardError::Validation(err.0)
    }
}

impl Classify for WardError {
    fn kind(&self) -> ErrorKind {
        match self {
            WardError::Validation(_) => ErrorKind::ValidationFailure,
            WardError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            WardError::CapacityExceeded(_) => ErrorKind::CapacityExceeded,
            WardError::Database(err) => err.kind(),
            WardError::Billing(err) => err.kind(),
        }
    }
}

pub type WardResult<T> = Result<T, WardError>;
