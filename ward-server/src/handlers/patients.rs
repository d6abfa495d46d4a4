use axum::{
    extract::{Path, State},
    Json,
};
use database_layer::Patient;
use uuid::Uuid;
use ward_service::PatientDetails;

use crate::error::{api_success, ApiResult, CreatedResult, IntoApiResponse};
use crate::server::WardServer;

pub async fn list_patients(State(server): State<WardServer>) -> ApiResult<Vec<Patient>> {
    api_success(server.coordinator.patients())
}

pub async fn get_patient(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Patient> {
    server.coordinator.patient(id).into_api_response()
}

/// Admit a patient, occupying a bed when a ward is given
pub async fn admit_patient(
    State(server): State<WardServer>,
    Json(details): Json<PatientDetails>,
) -> CreatedResult<Patient> {
    server.coordinator.admit_patient(details).await.into_created()
}

pub async fn update_patient(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    Json(details): Json<PatientDetails>,
) -> ApiResult<Patient> {
    server.coordinator.update_patient(id, details).await.into_api_response()
}

pub async fn discharge_patient(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Patient> {
    server.coordinator.discharge_patient(id).await.into_api_response()
}

pub async fn delete_patient(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    server.coordinator.delete_patient(id).await.into_api_response()
}
