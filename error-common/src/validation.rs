//! Input validation shared by the WardCare services
//!
//! Services implement [`RequestValidation`] for their create and update
//! inputs and use the `validate_*!` macros inside `validate`. A failed check
//! returns [`ValidationFailure`], which every service error converts from.

use crate::codes::{Classify, ErrorKind};
use thiserror::Error;

/// A rejected input, carrying the message shown to the caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationFailure(pub String);

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Classify for ValidationFailure {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailure
    }
}

/// Trait for validating request payloads
///
/// # Example
///
/// ```rust
/// use error_common::{validate_range, validate_required, RequestValidation, ValidationFailure};
///
/// struct NewWard {
///     name: String,
///     total_beds: i32,
/// }
///
/// impl RequestValidation for NewWard {
///     fn validate(&self) -> Result<(), ValidationFailure> {
///         validate_required!(self.name, "Ward name is required");
///         validate_range!(&self.total_beds, 0, 10_000, "Total beds must be between 0 and 10000");
///         Ok(())
///     }
/// }
/// ```
pub trait RequestValidation {
    /// Returns `Ok(())` if validation passes
    fn validate(&self) -> Result<(), ValidationFailure>;
}

/// Validate a field with a custom predicate
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::validation::ValidationFailure::new($message).into());
        }
    };
}

/// Validate that a string field is not blank
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Validate an optional string field: blank when present is rejected
#[macro_export]
macro_rules! validate_optional {
    ($field:expr, $message:expr) => {
        $crate::validate_field!(
            $field,
            $field.as_deref().map_or(true, |value: &str| !value.trim().is_empty()),
            $message
        );
    };
}

/// Validate string length in characters
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Validate numeric ranges (inclusive)
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($field, *$field >= $min && *$field <= $max, $message);
    };
}
