use axum::{
    extract::{Path, State},
    Json,
};
use database_layer::{Doctor, StaffMember};
use uuid::Uuid;
use ward_service::StaffDetails;

use crate::error::{api_success, ApiResult, CreatedResult, IntoApiResponse};
use crate::server::WardServer;

pub async fn list_staff(State(server): State<WardServer>) -> ApiResult<Vec<StaffMember>> {
    api_success(server.coordinator.staff())
}

pub async fn get_staff_member(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<StaffMember> {
    server.coordinator.staff_member(id).into_api_response()
}

pub async fn create_staff(
    State(server): State<WardServer>,
    Json(details): Json<StaffDetails>,
) -> CreatedResult<StaffMember> {
    server.coordinator.add_staff(details).await.into_created()
}

pub async fn update_staff(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    Json(details): Json<StaffDetails>,
) -> ApiResult<StaffMember> {
    server.coordinator.update_staff(id, details).await.into_api_response()
}

pub async fn delete_staff(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    server.coordinator.delete_staff(id).await.into_api_response()
}

pub async fn list_doctors(State(server): State<WardServer>) -> ApiResult<Vec<Doctor>> {
    api_success(server.coordinator.doctors())
}
