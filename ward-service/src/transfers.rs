use chrono::Utc;
use database_layer::{Applied, ChangeSet, Mutation, Patient, TransferStatus, WardTransfer};
use error_common::RequestValidation;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{WardError, WardResult};
use crate::requests::{NewTransfer, TransferApproval, TransferCancellation};
use crate::service::WardService;

/// Actions that move a transfer between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    Approve,
    Complete,
    Cancel,
}

impl fmt::Display for TransferAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransferAction::Approve => "approve",
            TransferAction::Complete => "complete",
            TransferAction::Cancel => "cancel",
        })
    }
}

/// Transfer transition table; `None` means the action is not allowed.
///
/// Completion is accepted straight from Pending as well as from Approved.
pub fn transition(from: TransferStatus, action: TransferAction) -> Option<TransferStatus> {
    use TransferStatus::{Approved, Cancelled, Completed, Pending};
    match (from, action) {
        (Pending, TransferAction::Approve) => Some(Approved),
        (Pending | Approved, TransferAction::Complete) => Some(Completed),
        (Pending | Approved, TransferAction::Cancel) => Some(Cancelled),
        _ => None,
    }
}

fn next_status(transfer: &WardTransfer, action: TransferAction) -> WardResult<TransferStatus> {
    transition(transfer.status, action).ok_or_else(|| {
        warn!(transfer_id = %transfer.id, status = %transfer.status, %action, "Rejected transfer transition");
        WardError::InvalidTransition(format!(
            "cannot {action} transfer {} while it is {}",
            transfer.id, transfer.status
        ))
    })
}

fn require_active(patient: &Patient, action: &str) -> WardResult<()> {
    if !patient.status.is_active() {
        warn!(patient_id = %patient.id, action, "Rejected transfer for discharged patient");
        return Err(WardError::InvalidTransition(format!(
            "cannot {action} a transfer for discharged patient {}",
            patient.id
        )));
    }
    Ok(())
}

impl WardService {
    /// Request a transfer; the source ward and bed are taken from the patient now
    pub async fn create_transfer(&self, request: NewTransfer) -> WardResult<Applied<WardTransfer>> {
        request.validate()?;
        let patient = self.store().get_patient(request.patient_id).await?;
        require_active(&patient, "create")?;
        let destination = self.store().get_ward(request.to_ward_id).await?;

        let to_bed_number = request.to_bed_number.trim().to_string();
        if patient.ward_id == Some(destination.id) && patient.bed_number.as_deref() == Some(to_bed_number.as_str()) {
            return Err(WardError::Validation(
                "Destination must differ from the patient's current ward or bed".to_string(),
            ));
        }

        let transfer = WardTransfer {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            from_ward_id: patient.ward_id,
            from_bed_number: patient.bed_number.clone(),
            to_ward_id: destination.id,
            to_bed_number,
            transfer_reason: request.transfer_reason,
            transferred_by: request.transferred_by,
            transferred_by_role: request.transferred_by_role,
            status: TransferStatus::Pending,
            transfer_date: Utc::now(),
            approved_by: None,
            approval_date: None,
            notes: request.notes,
        };
        if let Some(notes) = &transfer.notes {
            debug!(transfer_id = %transfer.id, notes = %self.redactor.redact(notes), "Transfer notes");
        }

        let patch = self
            .transactions
            .execute(ChangeSet::new("create_transfer").with(Mutation::InsertTransfer(transfer.clone())))
            .await?;

        info!(
            transfer_id = %transfer.id,
            patient_id = %transfer.patient_id,
            from_ward = ?transfer.from_ward_id,
            to_ward = %transfer.to_ward_id,
            "Transfer requested"
        );
        Ok(Applied::new(transfer, patch))
    }

    pub async fn approve_transfer(&self, id: Uuid, approval: TransferApproval) -> WardResult<Applied<WardTransfer>> {
        approval.validate()?;
        let current = self.store().get_transfer(id).await?;
        let status = next_status(&current, TransferAction::Approve)?;

        let approved = WardTransfer {
            status,
            approved_by: Some(approval.approved_by.trim().to_string()),
            approval_date: Some(Utc::now()),
            ..current
        };
        let patch = self
            .transactions
            .execute(ChangeSet::new("approve_transfer").with(Mutation::UpdateTransfer(approved.clone())))
            .await?;

        info!(transfer_id = %id, "Transfer approved");
        Ok(Applied::new(approved, patch))
    }

    /// Complete a transfer: move the patient and both bed counts.
    ///
    /// This is the only point where a transfer changes bed counts. The bed
    /// released is the one the patient holds at completion time.
    pub async fn complete_transfer(&self, id: Uuid) -> WardResult<Applied<WardTransfer>> {
        let current = self.store().get_transfer(id).await?;
        let status = next_status(&current, TransferAction::Complete)?;
        let patient = self.store().get_patient(current.patient_id).await?;
        require_active(&patient, "complete")?;
        let destination = self.store().get_ward(current.to_ward_id).await?;

        let source = patient.occupied_ward();
        if source != current.from_ward_id {
            warn!(
                transfer_id = %id,
                requested_from = ?current.from_ward_id,
                current_ward = ?source,
                "Patient changed ward since the transfer was requested"
            );
        }

        let completed = WardTransfer {
            status,
            approval_date: current.approval_date.or_else(|| Some(Utc::now())),
            ..current
        };
        let moved = Patient {
            ward_id: Some(destination.id),
            bed_number: Some(completed.to_bed_number.clone()),
            ..patient
        };

        let mut changes = ChangeSet::new("complete_transfer")
            .with(Mutation::UpdateTransfer(completed.clone()))
            .with(Mutation::UpdatePatient(moved));
        if source != Some(destination.id) {
            if let Some(ward_id) = source {
                changes.push(self.beds.release(ward_id));
            }
            changes.push(self.beds.occupy(&destination)?);
        }
        let patch = self.transactions.execute(changes).await?;

        info!(
            transfer_id = %id,
            patient_id = %completed.patient_id,
            from_ward = ?source,
            to_ward = %destination.id,
            "Transfer completed"
        );
        let transfer = patch.transfer(id).cloned().unwrap_or(completed);
        Ok(Applied::new(transfer, patch))
    }

    /// Cancel a pending or approved transfer; bed counts are untouched
    pub async fn cancel_transfer(
        &self,
        id: Uuid,
        cancellation: TransferCancellation,
    ) -> WardResult<Applied<WardTransfer>> {
        cancellation.validate()?;
        let current = self.store().get_transfer(id).await?;
        let status = next_status(&current, TransferAction::Cancel)?;

        let approved_by = cancellation
            .cancelled_by
            .map(|name| name.trim().to_string())
            .or_else(|| current.approved_by.clone());
        let cancelled = WardTransfer {
            status,
            approved_by,
            ..current
        };
        let patch = self
            .transactions
            .execute(ChangeSet::new("cancel_transfer").with(Mutation::UpdateTransfer(cancelled.clone())))
            .await?;

        info!(transfer_id = %id, "Transfer cancelled");
        Ok(Applied::new(cancelled, patch))
    }

    /// Remove a completed or cancelled transfer
    pub async fn delete_transfer(&self, id: Uuid) -> WardResult<Applied<Uuid>> {
        let current = self.store().get_transfer(id).await?;
        if !current.status.is_terminal() {
            warn!(transfer_id = %id, status = %current.status, "Rejected deletion of open transfer");
            return Err(WardError::InvalidTransition(format!(
                "cannot delete transfer {id} while it is {}",
                current.status
            )));
        }

        let patch = self
            .transactions
            .execute(ChangeSet::new("delete_transfer").with(Mutation::DeleteTransfer(id)))
            .await?;

        info!(transfer_id = %id, "Transfer deleted");
        Ok(Applied::new(id, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{details, occupied, seed_ward, service};
    use config_engine::Policies;
    use database_layer::{InMemoryStore, Ward, WardStore};
    use std::sync::Arc;

    struct Scenario {
        service: WardService,
        store: Arc<InMemoryStore>,
        general: Ward,
        icu: Ward,
        patient: Patient,
    }

    async fn scenario() -> Scenario {
        let (service, store) = service(Policies::default());
        let general = seed_ward(&store, "General Ward A", 20, 15).await;
        let icu = seed_ward(&store, "ICU Ward", 10, 8).await;
        let patient = service.admit_patient(details(Some(general.id), "A-1")).await.unwrap().value;
        Scenario { service, store, general, icu, patient }
    }

    fn request(patient_id: Uuid, to_ward_id: Uuid, bed: &str) -> NewTransfer {
        NewTransfer {
            patient_id,
            to_ward_id,
            to_bed_number: bed.to_string(),
            transfer_reason: "Condition deteriorated".to_string(),
            transferred_by: "Dr. Smith".to_string(),
            transferred_by_role: "Doctor".to_string(),
            notes: None,
        }
    }

    #[test]
    fn transition_table() {
        use TransferAction::{Approve, Cancel, Complete};
        use TransferStatus::{Approved, Cancelled, Completed, Pending};

        assert_eq!(transition(Pending, Approve), Some(Approved));
        assert_eq!(transition(Pending, Complete), Some(Completed));
        assert_eq!(transition(Approved, Complete), Some(Completed));
        assert_eq!(transition(Pending, Cancel), Some(Cancelled));
        assert_eq!(transition(Approved, Cancel), Some(Cancelled));
        assert_eq!(transition(Approved, Approve), None);
        for terminal in [Completed, Cancelled] {
            for action in [Approve, Complete, Cancel] {
                assert_eq!(transition(terminal, action), None);
            }
        }
    }

    #[tokio::test]
    async fn create_snapshots_the_source_without_touching_beds() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.icu.id, "B-2"))
            .await
            .unwrap()
            .value;

        assert_eq!(transfer.status, TransferStatus::Pending);
        assert_eq!(transfer.from_ward_id, Some(s.general.id));
        assert_eq!(transfer.from_bed_number.as_deref(), Some("A-1"));
        assert_eq!(occupied(&s.store, s.general.id).await, 16);
        assert_eq!(occupied(&s.store, s.icu.id).await, 8);
    }

    #[tokio::test]
    async fn completing_moves_patient_and_beds_exactly_once() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.icu.id, "B-2"))
            .await
            .unwrap()
            .value;
        let approval = TransferApproval { approved_by: "Dr. Johnson".to_string() };
        let approved = s.service.approve_transfer(transfer.id, approval).await.unwrap().value;
        assert_eq!(approved.status, TransferStatus::Approved);
        assert_eq!(occupied(&s.store, s.icu.id).await, 8);

        let completed = s.service.complete_transfer(transfer.id).await.unwrap();
        assert_eq!(completed.value.status, TransferStatus::Completed);
        assert_eq!(completed.value.approval_date, approved.approval_date);

        let patient = s.store.get_patient(s.patient.id).await.unwrap();
        assert_eq!(patient.ward_id, Some(s.icu.id));
        assert_eq!(patient.bed_number.as_deref(), Some("B-2"));
        assert_eq!(occupied(&s.store, s.general.id).await, 15);
        assert_eq!(occupied(&s.store, s.icu.id).await, 9);

        let again = s.service.complete_transfer(transfer.id).await.unwrap_err();
        assert!(matches!(again, WardError::InvalidTransition(_)));
        assert_eq!(occupied(&s.store, s.general.id).await, 15);
        assert_eq!(occupied(&s.store, s.icu.id).await, 9);
    }

    #[tokio::test]
    async fn pending_transfer_can_complete_directly() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.icu.id, "B-2"))
            .await
            .unwrap()
            .value;
        let completed = s.service.complete_transfer(transfer.id).await.unwrap().value;
        assert!(completed.approval_date.is_some());
        assert_eq!(occupied(&s.store, s.icu.id).await, 9);
    }

    #[tokio::test]
    async fn bed_change_within_a_ward_keeps_counts() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.general.id, "A-7"))
            .await
            .unwrap()
            .value;
        s.service.complete_transfer(transfer.id).await.unwrap();

        assert_eq!(occupied(&s.store, s.general.id).await, 16);
        let patient = s.store.get_patient(s.patient.id).await.unwrap();
        assert_eq!(patient.bed_number.as_deref(), Some("A-7"));
    }

    #[tokio::test]
    async fn same_ward_and_bed_is_rejected() {
        let s = scenario().await;
        let err = s
            .service
            .create_transfer(request(s.patient.id, s.general.id, "A-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, WardError::Validation(_)));
    }

    #[tokio::test]
    async fn cancel_changes_only_the_status() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.icu.id, "B-2"))
            .await
            .unwrap()
            .value;
        let cancellation = TransferCancellation { cancelled_by: Some("Dr. Johnson".to_string()) };
        let cancelled = s.service.cancel_transfer(transfer.id, cancellation).await.unwrap();

        assert_eq!(cancelled.value.status, TransferStatus::Cancelled);
        assert_eq!(cancelled.value.approved_by.as_deref(), Some("Dr. Johnson"));
        assert_eq!(cancelled.patch.len(), 1);
        assert!(cancelled.patch.wards().is_empty());
        assert_eq!(occupied(&s.store, s.general.id).await, 16);
        assert_eq!(occupied(&s.store, s.icu.id).await, 8);

        assert!(matches!(
            s.service.complete_transfer(transfer.id).await,
            Err(WardError::InvalidTransition(_))
        ));
    }

    #[tokio::test]
    async fn only_terminal_transfers_can_be_deleted() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.icu.id, "B-2"))
            .await
            .unwrap()
            .value;
        assert!(matches!(
            s.service.delete_transfer(transfer.id).await,
            Err(WardError::InvalidTransition(_))
        ));

        s.service
            .cancel_transfer(transfer.id, TransferCancellation::default())
            .await
            .unwrap();
        s.service.delete_transfer(transfer.id).await.unwrap();
        assert!(s.store.get_transfer(transfer.id).await.is_err());
    }

    #[tokio::test]
    async fn discharged_patients_cannot_be_transferred() {
        let s = scenario().await;
        let transfer = s
            .service
            .create_transfer(request(s.patient.id, s.icu.id, "B-2"))
            .await
            .unwrap()
            .value;
        s.service.discharge_patient(s.patient.id).await.unwrap();

        assert!(matches!(
            s.service.create_transfer(request(s.patient.id, s.icu.id, "B-3")).await,
            Err(WardError::InvalidTransition(_))
        ));
        assert!(matches!(
            s.service.complete_transfer(transfer.id).await,
            Err(WardError::InvalidTransition(_))
        ));
        assert_eq!(occupied(&s.store, s.icu.id).await, 8);
    }
}
