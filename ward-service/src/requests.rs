// Create and update inputs for wards, patients, transfers, staff and forms
use database_layer::{PatientStatus, Shift, StaffRole, StaffStatus};
use error_common::{
    validate_field, validate_length, validate_optional, validate_range, validate_required, RequestValidation,
    ValidationFailure,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_PATIENT_AGE: i32 = 150;
pub const MAX_WARD_BEDS: i32 = 10_000;

fn default_patient_status() -> PatientStatus {
    PatientStatus::Admitted
}

fn default_staff_status() -> StaffStatus {
    StaffStatus::Active
}

/// Ward fields as entered on the ward form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardDetails {
    pub name: String,
    pub floor: String,
    pub total_beds: i32,
    #[serde(default)]
    pub occupied_beds: i32,
    pub department: String,
    pub nurse_in_charge: String,
}

impl RequestValidation for WardDetails {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.name, "Ward name is required");
        validate_length!(self.name, 1, 100, "Ward name must be at most 100 characters");
        validate_range!(&self.total_beds, 0, MAX_WARD_BEDS, "Total beds must be between 0 and 10000");
        validate_field!(self.occupied_beds, self.occupied_beds >= 0, "Occupied beds must not be negative");
        Ok(())
    }
}

/// Patient fields used for admission and for edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub age: i32,
    pub gender: String,
    #[serde(default)]
    pub ward_id: Option<Uuid>,
    #[serde(default)]
    pub bed_number: Option<String>,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default = "default_patient_status")]
    pub status: PatientStatus,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub blood_group: String,
}

impl PatientDetails {
    fn has_bed_number(&self) -> bool {
        self.bed_number.as_deref().map_or(false, |bed| !bed.trim().is_empty())
    }
}

impl RequestValidation for PatientDetails {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.name, "Patient name is required");
        validate_range!(&self.age, 0, MAX_PATIENT_AGE, "Age must be between 0 and 150");
        validate_field!(
            self.bed_number,
            self.ward_id.is_none() || self.has_bed_number(),
            "Bed number is required when a ward is assigned"
        );
        Ok(())
    }
}

/// Request to move a patient to another ward or bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransfer {
    pub patient_id: Uuid,
    pub to_ward_id: Uuid,
    pub to_bed_number: String,
    pub transfer_reason: String,
    pub transferred_by: String,
    #[serde(default)]
    pub transferred_by_role: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RequestValidation for NewTransfer {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.to_bed_number, "Destination bed is required");
        validate_required!(self.transfer_reason, "Transfer reason is required");
        validate_required!(self.transferred_by, "Transferred by is required");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferApproval {
    pub approved_by: String,
}

impl RequestValidation for TransferApproval {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.approved_by, "Approved by is required");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferCancellation {
    /// Recorded as the approver of the cancellation when present
    #[serde(default)]
    pub cancelled_by: Option<String>,
}

impl RequestValidation for TransferCancellation {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_optional!(self.cancelled_by, "Cancelled by must not be blank");
        Ok(())
    }
}

/// Staff roster entry fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffDetails {
    pub name: String,
    pub role: StaffRole,
    pub department: String,
    #[serde(default)]
    pub specialization: Option<String>,
    pub phone: String,
    pub email: String,
    pub shift: Shift,
    #[serde(default = "default_staff_status")]
    pub status: StaffStatus,
}

impl RequestValidation for StaffDetails {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.name, "Staff name is required");
        validate_required!(self.department, "Department is required");
        validate_required!(self.phone, "Phone is required");
        validate_field!(
            self.email,
            self.email.trim().split_once('@').map_or(false, |(user, domain)| !user.is_empty() && domain.contains('.')),
            "Email address is invalid"
        );
        Ok(())
    }
}

/// A filled monitoring or OT form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewForm {
    pub patient_id: Uuid,
    /// Template category; "OT" forms are stored with the OT records
    pub form_type: String,
    pub form_name: String,
    #[serde(default)]
    pub template_id: Option<String>,
    pub filled_by: String,
    #[serde(default)]
    pub filled_by_role: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Field values and drawing annotations, stored as given
    #[serde(default)]
    pub form_data: serde_json::Value,
}

impl RequestValidation for NewForm {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.form_type, "Form type is required");
        validate_required!(self.form_name, "Form name is required");
        validate_required!(self.filled_by, "Filled by is required");
        Ok(())
    }
}
