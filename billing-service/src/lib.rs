//! Billing Service for hospital stays
//!
//! Provides the billing half of the ward coordinator:
//! - Bill totals from line items, tax and discount percentages
//! - Draft bill lifecycle (create, edit, finalize, cancel, delete)
//! - Payment recording and balance/status recomputation
//! - Bill and payment numbering with a timestamp fallback
//! - Overdue sweeps and collection summaries

pub mod error;
pub mod models;
pub mod numbering;
pub mod payment;
pub mod reporting;
pub mod service;
pub mod totals;

pub use error::*;
pub use models::*;
pub use numbering::*;
pub use payment::*;
pub use reporting::*;
pub use service::*;
pub use totals::*;
