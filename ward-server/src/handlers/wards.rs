use axum::{
    extract::{Path, State},
    Json,
};
use database_layer::{BedDirection, Ward};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use ward_service::WardDetails;

use crate::error::{api_success, ApiResult, CreatedResult, IntoApiResponse};
use crate::server::WardServer;

/// Body of the bed adjustment endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BedAdjustment {
    pub direction: BedDirection,
}

pub async fn list_wards(State(server): State<WardServer>) -> ApiResult<Vec<Ward>> {
    api_success(server.coordinator.wards())
}

pub async fn get_ward(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Ward> {
    server.coordinator.ward(id).into_api_response()
}

pub async fn create_ward(State(server): State<WardServer>, Json(details): Json<WardDetails>) -> CreatedResult<Ward> {
    server.coordinator.add_ward(details).await.into_created()
}

pub async fn update_ward(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    Json(details): Json<WardDetails>,
) -> ApiResult<Ward> {
    server.coordinator.update_ward(id, details).await.into_api_response()
}

pub async fn delete_ward(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    server.coordinator.delete_ward(id).await.into_api_response()
}

/// Move a ward's occupied counter one bed up or down
pub async fn adjust_beds(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    Json(adjustment): Json<BedAdjustment>,
) -> ApiResult<Ward> {
    server
        .coordinator
        .adjust_bed_count(id, adjustment.direction)
        .await
        .into_api_response()
}
