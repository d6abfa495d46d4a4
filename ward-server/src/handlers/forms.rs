use axum::{
    extract::{Query, State},
    Json,
};
use database_layer::{FormKind, FormRecord};
use serde::Deserialize;
use uuid::Uuid;
use ward_service::NewForm;

use crate::error::{api_success, ApiResult, CreatedResult, IntoApiResponse};
use crate::server::WardServer;

#[derive(Debug, Default, Deserialize)]
pub struct FormFilter {
    pub patient_id: Option<Uuid>,
}

/// Save a form; `form_type == "OT"` lands in the operation theatre table
pub async fn save_form(State(server): State<WardServer>, Json(request): Json<NewForm>) -> CreatedResult<FormRecord> {
    server.coordinator.save_form(request).await.into_created()
}

pub async fn list_monitoring_forms(
    State(server): State<WardServer>,
    Query(filter): Query<FormFilter>,
) -> ApiResult<Vec<FormRecord>> {
    api_success(server.coordinator.forms(FormKind::Monitoring, filter.patient_id))
}

pub async fn list_ot_forms(
    State(server): State<WardServer>,
    Query(filter): Query<FormFilter>,
) -> ApiResult<Vec<FormRecord>> {
    api_success(server.coordinator.forms(FormKind::OperationTheatre, filter.patient_id))
}
