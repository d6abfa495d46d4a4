use chrono::Utc;
use database_layer::{Applied, ChangeSet, Mutation, Patient, PatientStatus};
use error_common::RequestValidation;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{WardError, WardResult};
use crate::requests::PatientDetails;
use crate::service::WardService;

fn reject_discharged(patient: &Patient, action: &str) -> WardResult<()> {
    if patient.status == PatientStatus::Discharged {
        warn!(patient_id = %patient.id, action, "Rejected change to discharged patient");
        return Err(WardError::InvalidTransition(format!(
            "cannot {action} patient {} after discharge",
            patient.id
        )));
    }
    Ok(())
}

fn clean_bed(bed_number: Option<String>) -> Option<String> {
    bed_number
        .map(|bed| bed.trim().to_string())
        .filter(|bed| !bed.is_empty())
}

impl WardService {
    /// Bed writes needed when a patient goes from holding `before` to `after`
    async fn plan_bed_move(&self, before: Option<Uuid>, after: Option<Uuid>) -> WardResult<Vec<Mutation>> {
        if before == after {
            return Ok(Vec::new());
        }
        let mut mutations = Vec::with_capacity(2);
        if let Some(ward_id) = before {
            mutations.push(self.beds.release(ward_id));
        }
        if let Some(ward_id) = after {
            let ward = self.store().get_ward(ward_id).await?;
            mutations.push(self.beds.occupy(&ward)?);
        }
        Ok(mutations)
    }

    /// Admit a patient; an active patient with a ward takes one of its beds
    pub async fn admit_patient(&self, details: PatientDetails) -> WardResult<Applied<Patient>> {
        details.validate()?;
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            name: details.name.trim().to_string(),
            age: details.age,
            gender: details.gender,
            ward_id: details.ward_id,
            bed_number: clean_bed(details.bed_number),
            admission_date: now,
            discharge_date: (details.status == PatientStatus::Discharged).then_some(now),
            diagnosis: details.diagnosis,
            status: details.status,
            doctor: details.doctor,
            emergency_contact: details.emergency_contact,
            blood_group: details.blood_group,
        };
        if let Some(ward_id) = patient.ward_id {
            self.store().get_ward(ward_id).await?;
        }

        let mut changes = ChangeSet::new("admit_patient").with(Mutation::InsertPatient(patient.clone()));
        changes.extend(self.plan_bed_move(None, patient.occupied_ward()).await?);
        let patch = self.transactions.execute(changes).await?;

        info!(
            patient_id = %patient.id,
            ward_id = ?patient.ward_id,
            status = %patient.status,
            "Patient admitted"
        );
        let patient = patch.patient(patient.id).cloned().unwrap_or(patient);
        Ok(Applied::new(patient, patch))
    }

    /// Edit a patient's record.
    ///
    /// A changed ward moves the bed immediately, without the transfer
    /// workflow. Setting the status to Discharged releases the bed.
    pub async fn update_patient(&self, id: Uuid, details: PatientDetails) -> WardResult<Applied<Patient>> {
        details.validate()?;
        let current = self.store().get_patient(id).await?;
        reject_discharged(&current, "update")?;
        if let Some(ward_id) = details.ward_id.filter(|ward_id| Some(*ward_id) != current.ward_id) {
            self.store().get_ward(ward_id).await?;
        }

        let discharged_now = details.status == PatientStatus::Discharged;
        let updated = Patient {
            name: details.name.trim().to_string(),
            age: details.age,
            gender: details.gender,
            ward_id: details.ward_id,
            bed_number: clean_bed(details.bed_number),
            discharge_date: if discharged_now { Some(Utc::now()) } else { current.discharge_date },
            diagnosis: details.diagnosis,
            status: details.status,
            doctor: details.doctor,
            emergency_contact: details.emergency_contact,
            blood_group: details.blood_group,
            ..current.clone()
        };

        let mut changes = ChangeSet::new("update_patient").with(Mutation::UpdatePatient(updated.clone()));
        changes.extend(
            self.plan_bed_move(current.occupied_ward(), updated.occupied_ward())
                .await?,
        );
        let patch = self.transactions.execute(changes).await?;

        if current.ward_id != updated.ward_id {
            info!(
                patient_id = %id,
                from_ward = ?current.ward_id,
                to_ward = ?updated.ward_id,
                "Patient reassigned to another ward"
            );
        }
        info!(patient_id = %id, status = %updated.status, "Patient updated");
        let patient = patch.patient(id).cloned().unwrap_or(updated);
        Ok(Applied::new(patient, patch))
    }

    /// Discharge a patient and release the bed they held
    pub async fn discharge_patient(&self, id: Uuid) -> WardResult<Applied<Patient>> {
        let current = self.store().get_patient(id).await?;
        reject_discharged(&current, "discharge")?;

        let released = current.occupied_ward();
        let discharged = Patient {
            status: PatientStatus::Discharged,
            discharge_date: Some(Utc::now()),
            ..current
        };

        let mut changes = ChangeSet::new("discharge_patient").with(Mutation::UpdatePatient(discharged.clone()));
        if let Some(ward_id) = released {
            changes.push(self.beds.release(ward_id));
        }
        let patch = self.transactions.execute(changes).await?;

        info!(patient_id = %id, ward_id = ?released, "Patient discharged");
        let patient = patch.patient(id).cloned().unwrap_or(discharged);
        Ok(Applied::new(patient, patch))
    }

    /// Remove a patient record, releasing any bed it still held
    pub async fn delete_patient(&self, id: Uuid) -> WardResult<Applied<Uuid>> {
        let current = self.store().get_patient(id).await?;

        let mut changes = ChangeSet::new("delete_patient");
        if let Some(ward_id) = current.occupied_ward() {
            changes.push(self.beds.release(ward_id));
        }
        changes.push(Mutation::DeletePatient(id));
        let patch = self.transactions.execute(changes).await?;

        info!(patient_id = %id, "Patient deleted");
        Ok(Applied::new(id, patch))
    }
}
