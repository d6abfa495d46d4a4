use database_layer::{DatabaseError, StatePatch};
use error_common::{Classify, ErrorKind, ValidationFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid bill transition: {0}")]
    InvalidTransition(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl BillingError {
    /// Writes that landed before a best-effort operation failed
    pub fn partial_patch(&self) -> Option<&StatePatch> {
        match self {
            BillingError::Database(err) => err.partial_patch(),
            _ => None,
        }
    }
}

impl From<ValidationFailure> for BillingError {
    fn from(err: ValidationFailure) -> Self {
        BillingError::Validation(err.0)
    }
}

impl Classify for BillingError {
    fn kind(&self) -> ErrorKind {
        match self {
            BillingError::Validation(_) => ErrorKind::ValidationFailure,
            BillingError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            BillingError::Database(err) => err.kind(),
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;
