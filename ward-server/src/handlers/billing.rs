use axum::{
    extract::{Path, Query, State},
    Json,
};
use billing_service::{BillUpdate, NewBill, NewPayment, PaymentReceipt};
use chrono::{NaiveDate, Utc};
use database_layer::{Bill, BillItem, Payment};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{api_success, ApiResult, CreatedResult, IntoApiResponse};
use crate::server::WardServer;

#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilter {
    pub bill_id: Option<Uuid>,
}

/// Optional body of the overdue sweep; defaults to today (UTC)
#[derive(Debug, Default, Deserialize)]
pub struct OverdueSweep {
    pub today: Option<NaiveDate>,
}

pub async fn list_bills(State(server): State<WardServer>) -> ApiResult<Vec<Bill>> {
    api_success(server.coordinator.bills())
}

pub async fn get_bill(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Bill> {
    server.coordinator.bill(id).into_api_response()
}

pub async fn list_bill_items(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Vec<BillItem>> {
    server.coordinator.bill_items(id).into_api_response()
}

pub async fn create_bill(State(server): State<WardServer>, Json(request): Json<NewBill>) -> CreatedResult<Bill> {
    server.coordinator.create_bill(request).await.into_created()
}

pub async fn update_bill(
    State(server): State<WardServer>,
    Path(id): Path<Uuid>,
    Json(update): Json<BillUpdate>,
) -> ApiResult<Bill> {
    server.coordinator.update_bill(id, update).await.into_api_response()
}

pub async fn finalize_bill(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Bill> {
    server.coordinator.finalize_bill(id).await.into_api_response()
}

pub async fn cancel_bill(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Bill> {
    server.coordinator.cancel_bill(id).await.into_api_response()
}

pub async fn delete_bill(State(server): State<WardServer>, Path(id): Path<Uuid>) -> ApiResult<Uuid> {
    server.coordinator.delete_bill(id).await.into_api_response()
}

pub async fn mark_overdue_bills(
    State(server): State<WardServer>,
    sweep: Option<Json<OverdueSweep>>,
) -> ApiResult<Vec<Bill>> {
    let today = sweep
        .and_then(|Json(body)| body.today)
        .unwrap_or_else(|| Utc::now().date_naive());
    server.coordinator.mark_overdue_bills(today).await.into_api_response()
}

pub async fn record_payment(
    State(server): State<WardServer>,
    Json(request): Json<NewPayment>,
) -> CreatedResult<PaymentReceipt> {
    server.coordinator.record_payment(request).await.into_created()
}

pub async fn list_payments(
    State(server): State<WardServer>,
    Query(filter): Query<PaymentFilter>,
) -> ApiResult<Vec<Payment>> {
    api_success(server.coordinator.payments(filter.bill_id))
}
