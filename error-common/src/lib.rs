//! Common error handling utilities for WardCare
//!
//! This crate provides the failure taxonomy shared by every WardCare service,
//! the uniform operation outcome envelope handed back to callers, and helpers
//! for keeping driver and connection details out of user-facing messages.
//!
//! # Error Categories
//!
//! - **NotFound**: a referenced ward, patient, bill or transfer does not exist
//! - **ValidationFailure**: required-field and range checks on inputs
//! - **InvalidTransition**: a lifecycle action not allowed from the current state
//! - **CapacityExceeded**: a ward is full and the capacity policy rejects overflow
//! - **RemotePersistenceFailure**: the backing store rejected a read or write
//! - **PartialApplication**: a multi-step write stopped part way through
//! - **Configuration**: invalid or missing configuration
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorKind, OperationOutcome};
//!
//! let outcome: OperationOutcome<u32> = OperationOutcome::failure(
//!     ErrorKind::NotFound,
//!     "Ward 7f9c not found",
//! );
//! assert!(!outcome.success);
//! assert_eq!(outcome.error_kind, Some(ErrorKind::NotFound));
//! ```

pub mod types;
pub mod codes;
pub mod outcome;
pub mod sanitization;
pub mod validation;

pub use types::*;
pub use codes::*;
pub use outcome::*;
pub use sanitization::*;
pub use validation::*;
