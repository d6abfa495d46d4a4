//! Ward Service - consistency coordinator for wards, patients and transfers
//!
//! Keeps three things in step whenever a patient is admitted, edited,
//! discharged, deleted or transferred:
//! - ward bed counters (`occupied_beds`, `available_beds`)
//! - the patient's current ward and bed
//! - transfer status, which changes bed counts only on completion
//!
//! Billing operations are delegated to `billing-service`. The
//! [`WardCoordinator`] wraps both services, returns the uniform
//! [`OperationOutcome`](error_common::OperationOutcome) and keeps the
//! in-process [`AppState`] current.
//!
//! # Example
//!
//! ```rust
//! use config_engine::WardCareConfig;
//! use database_layer::InMemoryStore;
//! use std::sync::Arc;
//! use ward_service::{PatientDetails, WardCoordinator, WardDetails};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! tokio::runtime::Runtime::new()?.block_on(async {
//!     let coordinator = WardCoordinator::start(Arc::new(InMemoryStore::new()), &WardCareConfig::default()).await?;
//!
//!     let ward = coordinator
//!         .add_ward(WardDetails {
//!             name: "General Ward A".to_string(),
//!             floor: "1".to_string(),
//!             total_beds: 20,
//!             occupied_beds: 0,
//!             department: "General Medicine".to_string(),
//!             nurse_in_charge: "Sarah Johnson".to_string(),
//!         })
//!         .await
//!         .into_data()
//!         .ok_or("ward not added")?;
//!
//!     let outcome = coordinator
//!         .admit_patient(PatientDetails {
//!             name: "John Doe".to_string(),
//!             age: 45,
//!             gender: "Male".to_string(),
//!             ward_id: Some(ward.id),
//!             bed_number: Some("G-1".to_string()),
//!             diagnosis: "Pneumonia".to_string(),
//!             status: database_layer::PatientStatus::Admitted,
//!             doctor: "Dr. Smith".to_string(),
//!             emergency_contact: "+1-555-0101".to_string(),
//!             blood_group: "O+".to_string(),
//!         })
//!         .await;
//!     assert!(outcome.success);
//!     assert_eq!(coordinator.dashboard().occupied_beds, 1);
//!     Ok::<(), Box<dyn std::error::Error>>(())
//! })
//! # }
//! ```

pub mod beds;
pub mod coordinator;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod patients;
pub mod requests;
pub mod service;
pub mod staff;
pub mod state;
pub mod transfers;
pub mod wards;

#[cfg(test)]
pub(crate) mod testing;

pub use beds::*;
pub use coordinator::*;
pub use dashboard::*;
pub use error::*;
pub use forms::*;
pub use requests::*;
pub use service::*;
pub use state::*;
pub use transfers::*;
