use axum::extract::State;
use billing_service::BillingSummary;
use ward_service::DashboardStats;

use crate::error::{api_success, ApiResult};
use crate::server::WardServer;

pub async fn dashboard(State(server): State<WardServer>) -> ApiResult<DashboardStats> {
    api_success(server.coordinator.dashboard())
}

pub async fn billing_summary(State(server): State<WardServer>) -> ApiResult<BillingSummary> {
    api_success(server.coordinator.billing_summary())
}
