// Uniform entry point used by the HTTP layer
use billing_service::{BillUpdate, BillingReports, BillingService, BillingSummary, NewBill, NewPayment, PaymentReceipt};
use chrono::NaiveDate;
use config_engine::WardCareConfig;
use database_layer::{
    Applied, BedDirection, Bill, BillItem, DatabaseError, Doctor, FormKind, FormRecord, Patient, Payment,
    StaffMember, TransactionManager, Ward, WardStore, WardTransfer,
};
use error_common::{Classify, ErrorKind, OperationOutcome};
use logger_redacted::redactor_for;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::dashboard::DashboardStats;
use crate::error::{WardError, WardResult};
use crate::requests::*;
use crate::service::WardService;
use crate::state::{AppState, StateSnapshot};

/// Ward, patient, transfer and billing coordinator
///
/// Every write returns an [`OperationOutcome`] and never panics or errors
/// past this point. Successful changes are folded into the shared
/// [`AppState`]; so are the writes that did land when a best-effort
/// operation failed half way.
#[derive(Clone)]
pub struct WardCoordinator {
    wards: WardService,
    billing: BillingService,
    state: AppState,
    store: Arc<dyn WardStore>,
}

fn missing(entity: &'static str, id: Uuid) -> WardError {
    WardError::Database(DatabaseError::not_found(entity, id))
}

impl WardCoordinator {
    /// Build the services over `store` and load the initial state
    pub async fn start(store: Arc<dyn WardStore>, config: &WardCareConfig) -> WardResult<Self> {
        let transactions = TransactionManager::new(store.clone(), config.policies.consistency);
        let redactor = redactor_for(&config.logging);
        let wards = WardService::new(transactions.clone(), &config.policies).with_redactor(redactor.clone());
        let billing = BillingService::new(transactions, &config.policies, &config.billing).with_redactor(redactor);
        let state = AppState::load(store.as_ref()).await?;
        Ok(Self {
            wards,
            billing,
            state,
            store,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn is_healthy(&self) -> bool {
        self.store.is_healthy().await
    }

    /// Re-read every collection from the store
    pub async fn reload(&self) -> OperationOutcome<()> {
        let result = self.state.reload(self.store.as_ref()).await.map_err(WardError::from);
        if let Err(err) = &result {
            error!(error = %err, "State reload failed");
        }
        OperationOutcome::from_result(result)
    }

    fn settle<T>(&self, operation: &str, result: WardResult<Applied<T>>) -> OperationOutcome<T> {
        match result {
            Ok(applied) => {
                self.state.apply(&applied.patch);
                OperationOutcome::success(applied.value)
            }
            Err(err) => {
                if let Some(patch) = err.partial_patch() {
                    self.state.apply(patch);
                }
                match err.kind() {
                    ErrorKind::RemotePersistenceFailure | ErrorKind::PartialApplication => {
                        error_common::log_error(operation, &err);
                    }
                    kind => warn!(operation, error_kind = %kind, error = %err, "Operation rejected"),
                }
                OperationOutcome::from_result(Err(err))
            }
        }
    }

    fn lookup<T: Clone>(
        &self,
        entity: &'static str,
        id: Uuid,
        find: impl FnOnce(&StateSnapshot) -> Option<&T>,
    ) -> OperationOutcome<T> {
        let found = self.state.read(|state| find(state).cloned());
        OperationOutcome::from_result(found.ok_or_else(|| missing(entity, id)))
    }

    // ========================================================================
    // WARDS AND BEDS
    // ========================================================================

    pub async fn adjust_bed_count(&self, ward_id: Uuid, direction: BedDirection) -> OperationOutcome<Ward> {
        let result = self.wards.beds().adjust_bed_count(ward_id, direction).await;
        self.settle("adjust_bed_count", result)
    }

    pub async fn add_ward(&self, details: WardDetails) -> OperationOutcome<Ward> {
        self.settle("add_ward", self.wards.add_ward(details).await)
    }

    pub async fn update_ward(&self, id: Uuid, details: WardDetails) -> OperationOutcome<Ward> {
        self.settle("update_ward", self.wards.update_ward(id, details).await)
    }

    pub async fn delete_ward(&self, id: Uuid) -> OperationOutcome<Uuid> {
        self.settle("delete_ward", self.wards.delete_ward(id).await)
    }

    pub fn wards(&self) -> Vec<Ward> {
        self.state.read(|state| state.wards.clone())
    }

    pub fn ward(&self, id: Uuid) -> OperationOutcome<Ward> {
        self.lookup("Ward", id, |state| state.ward(id))
    }

    // ========================================================================
    // PATIENTS
    // ========================================================================

    pub async fn admit_patient(&self, details: PatientDetails) -> OperationOutcome<Patient> {
        self.settle("admit_patient", self.wards.admit_patient(details).await)
    }

    pub async fn update_patient(&self, id: Uuid, details: PatientDetails) -> OperationOutcome<Patient> {
        self.settle("update_patient", self.wards.update_patient(id, details).await)
    }

    pub async fn discharge_patient(&self, id: Uuid) -> OperationOutcome<Patient> {
        self.settle("discharge_patient", self.wards.discharge_patient(id).await)
    }

    pub async fn delete_patient(&self, id: Uuid) -> OperationOutcome<Uuid> {
        self.settle("delete_patient", self.wards.delete_patient(id).await)
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.state.read(|state| state.patients.clone())
    }

    pub fn patient(&self, id: Uuid) -> OperationOutcome<Patient> {
        self.lookup("Patient", id, |state| state.patient(id))
    }

    // ========================================================================
    // TRANSFERS
    // ========================================================================

    pub async fn create_transfer(&self, request: NewTransfer) -> OperationOutcome<WardTransfer> {
        self.settle("create_transfer", self.wards.create_transfer(request).await)
    }

    pub async fn approve_transfer(&self, id: Uuid, approval: TransferApproval) -> OperationOutcome<WardTransfer> {
        self.settle("approve_transfer", self.wards.approve_transfer(id, approval).await)
    }

    pub async fn complete_transfer(&self, id: Uuid) -> OperationOutcome<WardTransfer> {
        self.settle("complete_transfer", self.wards.complete_transfer(id).await)
    }

    pub async fn cancel_transfer(
        &self,
        id: Uuid,
        cancellation: TransferCancellation,
    ) -> OperationOutcome<WardTransfer> {
        self.settle("cancel_transfer", self.wards.cancel_transfer(id, cancellation).await)
    }

    pub async fn delete_transfer(&self, id: Uuid) -> OperationOutcome<Uuid> {
        self.settle("delete_transfer", self.wards.delete_transfer(id).await)
    }

    pub fn transfers(&self) -> Vec<WardTransfer> {
        self.state.read(|state| state.transfers.clone())
    }

    pub fn transfer(&self, id: Uuid) -> OperationOutcome<WardTransfer> {
        self.lookup("Transfer", id, |state| state.transfer(id))
    }

    // ========================================================================
    // STAFF, DOCTORS AND FORMS
    // ========================================================================

    pub async fn add_staff(&self, details: StaffDetails) -> OperationOutcome<StaffMember> {
        self.settle("add_staff", self.wards.add_staff(details).await)
    }

    pub async fn update_staff(&self, id: Uuid, details: StaffDetails) -> OperationOutcome<StaffMember> {
        self.settle("update_staff", self.wards.update_staff(id, details).await)
    }

    pub async fn delete_staff(&self, id: Uuid) -> OperationOutcome<Uuid> {
        self.settle("delete_staff", self.wards.delete_staff(id).await)
    }

    pub fn staff(&self) -> Vec<StaffMember> {
        self.state.read(|state| state.staff.clone())
    }

    pub fn staff_member(&self, id: Uuid) -> OperationOutcome<StaffMember> {
        self.lookup("Staff member", id, |state| state.staff_member(id))
    }

    pub fn doctors(&self) -> Vec<Doctor> {
        self.state.read(|state| state.doctors.clone())
    }

    pub async fn save_form(&self, request: NewForm) -> OperationOutcome<FormRecord> {
        self.settle("save_form", self.wards.save_form(request).await)
    }

    pub fn forms(&self, kind: FormKind, patient_id: Option<Uuid>) -> Vec<FormRecord> {
        self.state.read(|state| state.forms(kind, patient_id))
    }

    // ========================================================================
    // BILLING
    // ========================================================================

    pub async fn create_bill(&self, request: NewBill) -> OperationOutcome<Bill> {
        let result = self.billing.create_bill(request).await.map_err(WardError::from);
        self.settle("create_bill", result)
    }

    pub async fn update_bill(&self, id: Uuid, update: BillUpdate) -> OperationOutcome<Bill> {
        let result = self.billing.update_bill(id, update).await.map_err(WardError::from);
        self.settle("update_bill", result)
    }

    pub async fn finalize_bill(&self, id: Uuid) -> OperationOutcome<Bill> {
        let result = self.billing.finalize_bill(id).await.map_err(WardError::from);
        self.settle("finalize_bill", result)
    }

    pub async fn cancel_bill(&self, id: Uuid) -> OperationOutcome<Bill> {
        let result = self.billing.cancel_bill(id).await.map_err(WardError::from);
        self.settle("cancel_bill", result)
    }

    pub async fn delete_bill(&self, id: Uuid) -> OperationOutcome<Uuid> {
        let result = self.billing.delete_bill(id).await.map_err(WardError::from);
        self.settle("delete_bill", result)
    }

    pub async fn record_payment(&self, request: NewPayment) -> OperationOutcome<PaymentReceipt> {
        let result = self.billing.record_payment(request).await.map_err(WardError::from);
        self.settle("record_payment", result)
    }

    pub async fn mark_overdue_bills(&self, today: NaiveDate) -> OperationOutcome<Vec<Bill>> {
        let result = self.billing.mark_overdue_bills(today).await.map_err(WardError::from);
        self.settle("mark_overdue_bills", result)
    }

    pub fn bills(&self) -> Vec<Bill> {
        self.state.read(|state| state.bills.clone())
    }

    pub fn bill(&self, id: Uuid) -> OperationOutcome<Bill> {
        self.lookup("Bill", id, |state| state.bill(id))
    }

    pub fn bill_items(&self, bill_id: Uuid) -> OperationOutcome<Vec<BillItem>> {
        let result = self.state.read(|state| {
            state
                .bill(bill_id)
                .map(|_| state.items_of(bill_id))
                .ok_or_else(|| missing("Bill", bill_id))
        });
        OperationOutcome::from_result(result)
    }

    pub fn payments(&self, bill_id: Option<Uuid>) -> Vec<Payment> {
        self.state.read(|state| state.payments_for(bill_id))
    }

    // ========================================================================
    // REPORTS
    // ========================================================================

    pub fn dashboard(&self) -> DashboardStats {
        self.state.read(DashboardStats::compute)
    }

    pub fn billing_summary(&self) -> BillingSummary {
        self.state.read(|state| BillingReports::summary(&state.bills))
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }
}
