use axum::{
    extract::{Path, State},
    Json,
};
use database_layer::WardTransfer;
use uuid::Uuid;
use ward_service::{NewTransfer, TransferApproval, TransferCancellation};

use crate::error::{api_success, ApiResult, CreatedResult, IntoApiResponse};
use crate::server::WardServer;

pub async fn list_transfers(State(server): State<WardServer>) -> ApiResult<Vec<WardTransfer>> {
    api_success(server.coordinator.transfers())
}

pub async fn get_transfer(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<WardTransfer> {
    server.coordinator.transfer(id).into_api_response()
}

pub async fn create_transfer(
    State(server): State<WardServer>,
    Json(request): Json<NewTransfer>,
) -> CreatedResult<WardTransfer> {
    server.coordinator.create_transfer(request).await.into_created()
}

pub async fn approve_transfer(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    Json(approval): Json<TransferApproval>,
) -> ApiResult<WardTransfer> {
    server.coordinator.approve_transfer(id, approval).await.into_api_response()
}

/// Complete a transfer; this is the only step that moves beds
pub async fn complete_transfer(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<WardTransfer> {
    server.coordinator.complete_transfer(id).await.into_api_response()
}

/// Cancel a transfer; the body is optional
pub async fn cancel_transfer(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    cancellation: Option<Json<TransferCancellation>>,
) -> ApiResult<WardTransfer> {
    let cancellation = cancellation.map(|Json(body)| body).unwrap_or_default();
    server.coordinator.cancel_transfer(id, cancellation).await.into_api_response()
}

pub async fn delete_transfer(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    server.coordinator.delete_transfer(id).await.into_api_response()
}
