use database_layer::{Applied, ChangeSet, Mutation, StaffMember};
use error_common::RequestValidation;
use logger_redacted::redacted_info;
use tracing::info;
use uuid::Uuid;

use crate::error::WardResult;
use crate::requests::StaffDetails;
use crate::service::WardService;

fn member(id: Uuid, details: StaffDetails) -> StaffMember {
    StaffMember {
        id,
        name: details.name.trim().to_string(),
        role: details.role,
        department: details.department,
        specialization: details.specialization.filter(|value| !value.trim().is_empty()),
        phone: details.phone,
        email: details.email.trim().to_lowercase(),
        shift: details.shift,
        status: details.status,
    }
}

impl WardService {
    pub async fn add_staff(&self, details: StaffDetails) -> WardResult<Applied<StaffMember>> {
        details.validate()?;
        let staff = member(Uuid::new_v4(), details);

        let patch = self
            .transactions
            .execute(ChangeSet::new("add_staff").with(Mutation::InsertStaff(staff.clone())))
            .await?;

        info!(staff_id = %staff.id, role = %staff.role, shift = %staff.shift, "Staff member added");
        redacted_info!(self.redactor, "Contact for staff {}: {} {}", staff.id, staff.phone, staff.email);
        Ok(Applied::new(staff, patch))
    }

    pub async fn update_staff(&self, id: Uuid, details: StaffDetails) -> WardResult<Applied<StaffMember>> {
        details.validate()?;
        self.store().get_staff(id).await?;
        let staff = member(id, details);

        let patch = self
            .transactions
            .execute(ChangeSet::new("update_staff").with(Mutation::UpdateStaff(staff.clone())))
            .await?;

        info!(staff_id = %id, status = %staff.status, "Staff member updated");
        Ok(Applied::new(staff, patch))
    }

    pub async fn delete_staff(&self, id: Uuid) -> WardResult<Applied<Uuid>> {
        self.store().get_staff(id).await?;
        let patch = self
            .transactions
            .execute(ChangeSet::new("delete_staff").with(Mutation::DeleteStaff(id)))
            .await?;

        info!(staff_id = %id, "Staff member deleted");
        Ok(Applied::new(id, patch))
    }
}
