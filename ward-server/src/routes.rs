use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{billing, forms, health, patients, reports, staff, transfers, wards};
use crate::server::WardServer;

/// Route paths, grouped by resource
pub mod paths {
    pub const HEALTH: &str = "/health";

    pub mod state {
        pub const RELOAD: &str = "/api/v1/state/reload";
    }

    pub mod wards {
        pub const WARDS: &str = "/api/v1/wards";
        pub const WARD_BY_ID: &str = "/api/v1/wards/:id";
        pub const BEDS: &str = "/api/v1/wards/:id/beds";
    }

    pub mod patients {
        pub const PATIENTS: &str = "/api/v1/patients";
        pub const PATIENT_BY_ID: &str = "/api/v1/patients/:id";
        pub const DISCHARGE: &str = "/api/v1/patients/:id/discharge";
    }

    pub mod transfers {
        pub const TRANSFERS: &str = "/api/v1/transfers";
        pub const TRANSFER_BY_ID: &str = "/api/v1/transfers/:id";
        pub const APPROVE: &str = "/api/v1/transfers/:id/approve";
        pub const COMPLETE: &str = "/api/v1/transfers/:id/complete";
        pub const CANCEL: &str = "/api/v1/transfers/:id/cancel";
    }

    pub mod staff {
        pub const STAFF: &str = "/api/v1/staff";
        pub const STAFF_BY_ID: &str = "/api/v1/staff/:id";
        pub const DOCTORS: &str = "/api/v1/doctors";
    }

    pub mod forms {
        pub const FORMS: &str = "/api/v1/forms";
        pub const MONITORING: &str = "/api/v1/forms/monitoring";
        pub const OT: &str = "/api/v1/forms/ot";
    }

    pub mod billing {
        pub const BILLS: &str = "/api/v1/bills";
        pub const BILL_BY_ID: &str = "/api/v1/bills/:id";
        pub const BILL_ITEMS: &str = "/api/v1/bills/:id/items";
        pub const FINALIZE: &str = "/api/v1/bills/:id/finalize";
        pub const CANCEL: &str = "/api/v1/bills/:id/cancel";
        pub const OVERDUE: &str = "/api/v1/bills/overdue";
        pub const PAYMENTS: &str = "/api/v1/payments";
    }

    pub mod reports {
        pub const DASHBOARD: &str = "/api/v1/reports/dashboard";
        pub const BILLING_SUMMARY: &str = "/api/v1/reports/billing";
    }
}

/// Health check and state maintenance routes
pub fn health_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::HEALTH, get(health::health_check))
        .route(paths::state::RELOAD, post(health::reload_state))
}

/// Ward and bed count routes
pub fn ward_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::wards::WARDS, get(wards::list_wards).post(wards::create_ward))
        .route(
            paths::wards::WARD_BY_ID,
            get(wards::get_ward).put(wards::update_ward).delete(wards::delete_ward),
        )
        .route(paths::wards::BEDS, post(wards::adjust_beds))
}

/// Patient lifecycle routes
pub fn patient_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::patients::PATIENTS, get(patients::list_patients).post(patients::admit_patient))
        .route(
            paths::patients::PATIENT_BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(paths::patients::DISCHARGE, post(patients::discharge_patient))
}

/// Ward transfer routes
pub fn transfer_routes() -> Router<WardServer> {
    Router::new()
        .route(
            paths::transfers::TRANSFERS,
            get(transfers::list_transfers).post(transfers::create_transfer),
        )
        .route(
            paths::transfers::TRANSFER_BY_ID,
            get(transfers::get_transfer).delete(transfers::delete_transfer),
        )
        .route(paths::transfers::APPROVE, post(transfers::approve_transfer))
        .route(paths::transfers::COMPLETE, post(transfers::complete_transfer))
        .route(paths::transfers::CANCEL, post(transfers::cancel_transfer))
}

/// Staff directory and doctor routes
pub fn staff_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::staff::STAFF, get(staff::list_staff).post(staff::create_staff))
        .route(
            paths::staff::STAFF_BY_ID,
            get(staff::get_staff_member)
                .put(staff::update_staff)
                .delete(staff::delete_staff),
        )
        .route(paths::staff::DOCTORS, get(staff::list_doctors))
}

/// Monitoring and operation theatre form routes
pub fn form_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::forms::FORMS, post(forms::save_form))
        .route(paths::forms::MONITORING, get(forms::list_monitoring_forms))
        .route(paths::forms::OT, get(forms::list_ot_forms))
}

/// Bill and payment routes
pub fn billing_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::billing::BILLS, get(billing::list_bills).post(billing::create_bill))
        .route(paths::billing::OVERDUE, post(billing::mark_overdue_bills))
        .route(
            paths::billing::BILL_BY_ID,
            get(billing::get_bill)
                .put(billing::update_bill)
                .delete(billing::delete_bill),
        )
        .route(paths::billing::BILL_ITEMS, get(billing::list_bill_items))
        .route(paths::billing::FINALIZE, post(billing::finalize_bill))
        .route(paths::billing::CANCEL, post(billing::cancel_bill))
        .route(
            paths::billing::PAYMENTS,
            get(billing::list_payments).post(billing::record_payment),
        )
}

/// Dashboard and billing report routes
pub fn report_routes() -> Router<WardServer> {
    Router::new()
        .route(paths::reports::DASHBOARD, get(reports::dashboard))
        .route(paths::reports::BILLING_SUMMARY, get(reports::billing_summary))
}

/// Create all routes
pub fn create_routes() -> Router<WardServer> {
    Router::new()
        .merge(health_routes())
        .merge(ward_routes())
        .merge(patient_routes())
        .merge(transfer_routes())
        .merge(staff_routes())
        .merge(form_routes())
        .merge(billing_routes())
        .merge(report_routes())
}
