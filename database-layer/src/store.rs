use async_trait::async_trait;
use uuid::Uuid;

use crate::changes::{Change, Mutation};
use crate::error::DatabaseResult;
use crate::models::*;

/// Persistence boundary for the ward coordinator
///
/// List operations return rows in the order readers expect: wards by
/// creation, patients by admission date (newest first), staff and doctors
/// by name, transfers by transfer date (newest first), bills by bill date
/// (newest first), bill items by bill then creation, payments by payment
/// date (newest first), forms newest first.
#[async_trait]
pub trait WardStore: Send + Sync {
    async fn get_ward(&self, id: Uuid) -> DatabaseResult<Ward>;
    async fn list_wards(&self) -> DatabaseResult<Vec<Ward>>;

    async fn get_patient(&self, id: Uuid) -> DatabaseResult<Patient>;
    async fn list_patients(&self) -> DatabaseResult<Vec<Patient>>;

    async fn get_staff(&self, id: Uuid) -> DatabaseResult<StaffMember>;
    async fn list_staff(&self) -> DatabaseResult<Vec<StaffMember>>;
    async fn list_doctors(&self) -> DatabaseResult<Vec<Doctor>>;

    async fn get_transfer(&self, id: Uuid) -> DatabaseResult<WardTransfer>;
    async fn list_transfers(&self) -> DatabaseResult<Vec<WardTransfer>>;

    async fn get_bill(&self, id: Uuid) -> DatabaseResult<Bill>;
    async fn list_bills(&self) -> DatabaseResult<Vec<Bill>>;
    /// All items, or the items of one bill
    async fn list_bill_items(&self, bill_id: Option<Uuid>) -> DatabaseResult<Vec<BillItem>>;
    /// All payments, or the payments of one bill
    async fn list_payments(&self, bill_id: Option<Uuid>) -> DatabaseResult<Vec<Payment>>;

    async fn list_forms(&self, kind: FormKind) -> DatabaseResult<Vec<FormRecord>>;

    /// Next value of the bill number sequence
    async fn next_bill_number(&self, prefix: &str) -> DatabaseResult<String>;
    /// Next value of the payment number sequence
    async fn next_payment_number(&self, prefix: &str) -> DatabaseResult<String>;

    /// Apply a single write
    async fn apply(&self, mutation: &Mutation) -> DatabaseResult<Change>;

    /// Apply every write or none of them
    async fn apply_all(&self, mutations: &[Mutation]) -> DatabaseResult<Vec<Change>>;

    async fn is_healthy(&self) -> bool;
}
