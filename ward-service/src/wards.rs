use chrono::Utc;
use database_layer::{Applied, ChangeSet, Mutation, Ward};
use error_common::RequestValidation;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{WardError, WardResult};
use crate::requests::WardDetails;
use crate::service::WardService;

impl WardService {
    fn check_occupancy(&self, details: &WardDetails) -> WardResult<()> {
        if details.occupied_beds > details.total_beds && !self.beds.capacity().allows_overflow() {
            warn!(
                occupied = details.occupied_beds,
                total = details.total_beds,
                "Rejected ward with more occupied beds than beds"
            );
            return Err(WardError::CapacityExceeded(format!(
                "{} cannot have {} occupied beds out of {}",
                details.name.trim(),
                details.occupied_beds,
                details.total_beds
            )));
        }
        Ok(())
    }

    pub async fn add_ward(&self, details: WardDetails) -> WardResult<Applied<Ward>> {
        details.validate()?;
        self.check_occupancy(&details)?;

        let ward = Ward {
            id: Uuid::new_v4(),
            name: details.name.trim().to_string(),
            floor: details.floor,
            total_beds: details.total_beds,
            occupied_beds: details.occupied_beds,
            available_beds: 0,
            department: details.department,
            nurse_in_charge: details.nurse_in_charge,
            created_at: Utc::now(),
        }
        .recompute_available();

        let patch = self
            .transactions
            .execute(ChangeSet::new("add_ward").with(Mutation::InsertWard(ward.clone())))
            .await?;

        info!(ward_id = %ward.id, total = ward.total_beds, "Ward added");
        Ok(Applied::new(ward, patch))
    }

    /// Replace a ward's details; available beds are recomputed from the counters
    pub async fn update_ward(&self, id: Uuid, details: WardDetails) -> WardResult<Applied<Ward>> {
        details.validate()?;
        self.check_occupancy(&details)?;
        let current = self.store().get_ward(id).await?;

        let ward = Ward {
            name: details.name.trim().to_string(),
            floor: details.floor,
            total_beds: details.total_beds,
            occupied_beds: details.occupied_beds,
            department: details.department,
            nurse_in_charge: details.nurse_in_charge,
            ..current
        }
        .recompute_available();

        let patch = self
            .transactions
            .execute(ChangeSet::new("update_ward").with(Mutation::UpdateWard(ward.clone())))
            .await?;

        info!(ward_id = %id, occupied = ward.occupied_beds, available = ward.available_beds, "Ward updated");
        Ok(Applied::new(ward, patch))
    }

    /// Delete a ward no active patient is assigned to
    pub async fn delete_ward(&self, id: Uuid) -> WardResult<Applied<Uuid>> {
        let ward = self.store().get_ward(id).await?;
        let residents = self
            .store()
            .list_patients()
            .await?
            .iter()
            .filter(|patient| patient.occupied_ward() == Some(id))
            .count();
        if residents > 0 {
            warn!(ward_id = %id, residents, "Rejected deletion of occupied ward");
            return Err(WardError::InvalidTransition(format!(
                "cannot delete {} while {residents} active patient(s) are assigned to it",
                ward.name
            )));
        }

        let patch = self
            .transactions
            .execute(ChangeSet::new("delete_ward").with(Mutation::DeleteWard(id)))
            .await?;

        info!(ward_id = %id, "Ward deleted");
        Ok(Applied::new(id, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{details, seed_ward, service};
    use config_engine::{CapacityPolicy, Policies};
    use database_layer::WardStore;

    fn ward_details(total: i32, occupied: i32) -> WardDetails {
        WardDetails {
            name: "Maternity Ward".to_string(),
            floor: "3".to_string(),
            total_beds: total,
            occupied_beds: occupied,
            department: "Obstetrics".to_string(),
            nurse_in_charge: "Lisa Anderson".to_string(),
        }
    }

    #[tokio::test]
    async fn add_ward_derives_available_beds() {
        let (service, store) = service(Policies::default());
        let ward = service.add_ward(ward_details(15, 10)).await.unwrap().value;
        assert_eq!(ward.available_beds, 5);
        assert_eq!(store.get_ward(ward.id).await.unwrap(), ward);
    }

    #[tokio::test]
    async fn over_occupied_ward_needs_overflow_policy() {
        let (service, _) = service(Policies::default());
        assert!(matches!(
            service.add_ward(ward_details(10, 12)).await,
            Err(WardError::CapacityExceeded(_))
        ));

        let overflow = Policies {
            capacity: CapacityPolicy::AllowOverflow,
            ..Policies::default()
        };
        let (service, _) = crate::testing::service(overflow);
        let ward = service.add_ward(ward_details(10, 12)).await.unwrap().value;
        assert_eq!(ward.available_beds, -2);
    }

    #[tokio::test]
    async fn update_recomputes_available_and_keeps_creation_time() {
        let (service, store) = service(Policies::default());
        let ward = seed_ward(&store, "Maternity Ward", 15, 10).await;

        let updated = service.update_ward(ward.id, ward_details(25, 10)).await.unwrap().value;
        assert_eq!(updated.available_beds, 15);
        assert_eq!(updated.created_at, ward.created_at);
    }

    #[tokio::test]
    async fn occupied_ward_cannot_be_deleted() {
        let (service, store) = service(Policies::default());
        let ward = seed_ward(&store, "General Ward A", 20, 0).await;
        let patient = service.admit_patient(details(Some(ward.id), "G-1")).await.unwrap().value;

        assert!(matches!(
            service.delete_ward(ward.id).await,
            Err(WardError::InvalidTransition(_))
        ));

        service.discharge_patient(patient.id).await.unwrap();
        service.delete_ward(ward.id).await.unwrap();
        assert!(store.get_ward(ward.id).await.is_err());
    }
}
