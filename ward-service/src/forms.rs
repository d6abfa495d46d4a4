use chrono::Utc;
use database_layer::{Applied, ChangeSet, FormKind, FormRecord, Mutation};
use error_common::RequestValidation;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::WardResult;
use crate::requests::NewForm;
use crate::service::WardService;

pub const COMPLETED_FORM_STATUS: &str = "Completed";

impl WardService {
    /// Store a filled form with the monitoring or OT records, by form type
    pub async fn save_form(&self, request: NewForm) -> WardResult<Applied<FormRecord>> {
        request.validate()?;
        self.store().get_patient(request.patient_id).await?;

        let form = FormRecord {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            kind: FormKind::for_form_type(&request.form_type),
            form_type: request.form_type.trim().to_string(),
            form_name: request.form_name.trim().to_string(),
            template_id: request.template_id,
            filled_by: request.filled_by,
            filled_by_role: request.filled_by_role,
            notes: request.notes,
            form_data: request.form_data,
            status: COMPLETED_FORM_STATUS.to_string(),
            created_at: Utc::now(),
        };
        if let Some(notes) = &form.notes {
            debug!(form_id = %form.id, notes = %self.redactor.redact(notes), "Form notes");
        }

        let patch = self
            .transactions
            .execute(ChangeSet::new("save_form").with(Mutation::InsertForm(form.clone())))
            .await?;

        info!(form_id = %form.id, patient_id = %form.patient_id, kind = %form.kind, "Form saved");
        Ok(Applied::new(form, patch))
    }
}
