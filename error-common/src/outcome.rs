use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::codes::{Classify, ErrorKind};
use crate::sanitization::sanitize_message;

/// Uniform result shape returned by every coordinator operation
///
/// Either `success` is true and `data` carries the affected entity, or
/// `success` is false and `error` carries a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> OperationOutcome<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    /// Convert a service result, classifying and sanitizing the error
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        E: Classify + Display,
    {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.kind(), sanitize_message(&err.to_string())),
        }
    }

    pub fn map<U, F>(self, f: F) -> OperationOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        OperationOutcome {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            error_kind: self.error_kind,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("Ward {0} not found")]
    struct MissingWard(&'static str);

    impl Classify for MissingWard {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NotFound
        }
    }

    #[test]
    fn converts_errors_into_failure_envelope() {
        let outcome: OperationOutcome<u8> = OperationOutcome::from_result(Err(MissingWard("w-1")));
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Ward w-1 not found"));
        assert_eq!(outcome.error_kind, Some(ErrorKind::NotFound));
        assert!(outcome.data.is_none());
    }

    #[test]
    fn success_envelope_serializes_without_error_fields() {
        let outcome = OperationOutcome::success(42u32);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "data": 42 }));
        assert_eq!(outcome.map(|v| v + 1).into_data(), Some(43));
    }
}
