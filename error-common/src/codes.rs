// Error codes and failure classification shared by all WardCare services

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
}

pub mod lifecycle {
    pub const INVALID_TRANSITION: &str = "LIFECYCLE_2001";
    pub const CAPACITY_EXCEEDED: &str = "LIFECYCLE_2002";
}

pub mod lookup {
    pub const NOT_FOUND: &str = "LOOKUP_3001";
}

pub mod database {
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const PARTIAL_APPLICATION: &str = "DB_4004";
}

pub mod config {
    pub const INVALID_CONFIGURATION: &str = "CONFIG_5001";
}

/// Failure category reported across the coordinator boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    ValidationFailure,
    InvalidTransition,
    CapacityExceeded,
    RemotePersistenceFailure,
    PartialApplication,
    Configuration,
}

impl ErrorKind {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => lookup::NOT_FOUND,
            ErrorKind::ValidationFailure => validation::INVALID_INPUT,
            ErrorKind::InvalidTransition => lifecycle::INVALID_TRANSITION,
            ErrorKind::CapacityExceeded => lifecycle::CAPACITY_EXCEEDED,
            ErrorKind::RemotePersistenceFailure => database::QUERY_FAILED,
            ErrorKind::PartialApplication => database::PARTIAL_APPLICATION,
            ErrorKind::Configuration => config::INVALID_CONFIGURATION,
        }
    }

    /// Whether persisted state may be inconsistent after this failure
    pub fn leaves_inconsistent_state(&self) -> bool {
        matches!(self, ErrorKind::PartialApplication)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::ValidationFailure => "validation_failure",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::RemotePersistenceFailure => "remote_persistence_failure",
            ErrorKind::PartialApplication => "partial_application",
            ErrorKind::Configuration => "configuration",
        };
        f.write_str(label)
    }
}

/// Implemented by every service error so the boundary can classify it
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_partial_application_is_inconsistent() {
        assert!(ErrorKind::PartialApplication.leaves_inconsistent_state());
        assert!(!ErrorKind::RemotePersistenceFailure.leaves_inconsistent_state());
        assert!(!ErrorKind::NotFound.leaves_inconsistent_state());
    }

    #[test]
    fn kinds_serialize_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidTransition).unwrap();
        assert_eq!(json, "\"invalid_transition\"");
        assert_eq!(ErrorKind::InvalidTransition.to_string(), "invalid_transition");
        assert_eq!(ErrorKind::NotFound.code(), "LOOKUP_3001");
    }
}
