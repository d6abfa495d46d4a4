pub mod billing;
pub mod forms;
pub mod health;
pub mod patients;
pub mod reports;
pub mod staff;
pub mod transfers;
pub mod wards;
