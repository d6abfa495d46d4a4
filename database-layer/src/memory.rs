// In-memory store for development, tests and demo deployments
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::changes::{Change, Mutation};
use crate::error::{DatabaseError, DatabaseResult};
use crate::models::*;
use crate::store::WardStore;

#[derive(Debug, Clone, Default)]
struct Tables {
    wards: Vec<Ward>,
    patients: Vec<Patient>,
    staff: Vec<StaffMember>,
    doctors: Vec<Doctor>,
    transfers: Vec<WardTransfer>,
    bills: Vec<Bill>,
    bill_items: Vec<BillItem>,
    payments: Vec<Payment>,
    patient_forms: Vec<FormRecord>,
    ot_forms: Vec<FormRecord>,
}

/// Thread-safe in-memory [`WardStore`]
///
/// `apply_all` stages the writes on a copy of the tables and swaps the copy
/// in only when every write succeeded.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    bill_sequence: Arc<AtomicU64>,
    payment_sequence: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the read-only doctor directory
    pub fn with_doctors(self, doctors: Vec<Doctor>) -> Self {
        self.tables.write().doctors = doctors;
        self
    }
}

fn duplicate(entity: &str, id: Uuid) -> DatabaseError {
    DatabaseError::QueryFailed(format!("duplicate key: {entity} {id} already exists"))
}

fn replace<T, F>(rows: &mut [T], entity: &'static str, id: Uuid, matches: F, row: T) -> DatabaseResult<()>
where
    F: Fn(&T) -> bool,
{
    let slot = rows
        .iter_mut()
        .find(|existing| matches(existing))
        .ok_or(DatabaseError::not_found(entity, id))?;
    *slot = row;
    Ok(())
}

fn remove<T, F>(rows: &mut Vec<T>, entity: &'static str, id: Uuid, matches: F) -> DatabaseResult<()>
where
    F: Fn(&T) -> bool,
{
    let before = rows.len();
    rows.retain(|row| !matches(row));
    if rows.len() == before {
        return Err(DatabaseError::not_found(entity, id));
    }
    Ok(())
}

impl Tables {
    fn apply(&mut self, mutation: &Mutation) -> DatabaseResult<Change> {
        match mutation {
            Mutation::InsertWard(ward) => {
                if self.wards.iter().any(|w| w.id == ward.id) {
                    return Err(duplicate("ward", ward.id));
                }
                self.wards.push(ward.clone());
                Ok(Change::Ward(ward.clone()))
            }
            Mutation::UpdateWard(ward) => {
                replace(&mut self.wards, "Ward", ward.id, |w| w.id == ward.id, ward.clone())?;
                Ok(Change::Ward(ward.clone()))
            }
            Mutation::DeleteWard(id) => {
                remove(&mut self.wards, "Ward", *id, |w| w.id == *id)?;
                Ok(Change::WardRemoved(*id))
            }
            Mutation::AdjustBeds { ward_id, direction } => {
                let ward = self
                    .wards
                    .iter_mut()
                    .find(|w| w.id == *ward_id)
                    .ok_or(DatabaseError::not_found("Ward", *ward_id))?;
                *ward = ward.with_bed_adjustment(*direction);
                debug!(
                    ward_id = %ward.id,
                    occupied = ward.occupied_beds,
                    available = ward.available_beds,
                    "Adjusted bed count"
                );
                Ok(Change::Ward(ward.clone()))
            }
            Mutation::InsertPatient(patient) => {
                if self.patients.iter().any(|p| p.id == patient.id) {
                    return Err(duplicate("patient", patient.id));
                }
                self.patients.push(patient.clone());
                Ok(Change::Patient(patient.clone()))
            }
            Mutation::UpdatePatient(patient) => {
                replace(&mut self.patients, "Patient", patient.id, |p| p.id == patient.id, patient.clone())?;
                Ok(Change::Patient(patient.clone()))
            }
            Mutation::DeletePatient(id) => {
                remove(&mut self.patients, "Patient", *id, |p| p.id == *id)?;
                Ok(Change::PatientRemoved(*id))
            }
            Mutation::InsertStaff(member) => {
                if self.staff.iter().any(|s| s.id == member.id) {
                    return Err(duplicate("staff", member.id));
                }
                self.staff.push(member.clone());
                Ok(Change::Staff(member.clone()))
            }
            Mutation::UpdateStaff(member) => {
                replace(&mut self.staff, "Staff member", member.id, |s| s.id == member.id, member.clone())?;
                Ok(Change::Staff(member.clone()))
            }
            Mutation::DeleteStaff(id) => {
                remove(&mut self.staff, "Staff member", *id, |s| s.id == *id)?;
                Ok(Change::StaffRemoved(*id))
            }
            Mutation::InsertTransfer(transfer) => {
                if self.transfers.iter().any(|t| t.id == transfer.id) {
                    return Err(duplicate("transfer", transfer.id));
                }
                self.transfers.push(transfer.clone());
                Ok(Change::Transfer(transfer.clone()))
            }
            Mutation::UpdateTransfer(transfer) => {
                replace(&mut self.transfers, "Transfer", transfer.id, |t| t.id == transfer.id, transfer.clone())?;
                Ok(Change::Transfer(transfer.clone()))
            }
            Mutation::DeleteTransfer(id) => {
                remove(&mut self.transfers, "Transfer", *id, |t| t.id == *id)?;
                Ok(Change::TransferRemoved(*id))
            }
            Mutation::InsertBill(bill) => {
                if self.bills.iter().any(|b| b.id == bill.id || b.bill_number == bill.bill_number) {
                    return Err(duplicate("bill", bill.id));
                }
                self.bills.push(bill.clone());
                Ok(Change::Bill(bill.clone()))
            }
            Mutation::UpdateBill(bill) => {
                replace(&mut self.bills, "Bill", bill.id, |b| b.id == bill.id, bill.clone())?;
                Ok(Change::Bill(bill.clone()))
            }
            Mutation::DeleteBill(id) => {
                remove(&mut self.bills, "Bill", *id, |b| b.id == *id)?;
                self.bill_items.retain(|item| item.bill_id != *id);
                self.payments.retain(|payment| payment.bill_id != *id);
                Ok(Change::BillRemoved(*id))
            }
            Mutation::InsertBillItem(item) => {
                if !self.bills.iter().any(|b| b.id == item.bill_id) {
                    return Err(DatabaseError::not_found("Bill", item.bill_id));
                }
                self.bill_items.push(item.clone());
                Ok(Change::BillItem(item.clone()))
            }
            Mutation::DeleteBillItems { bill_id } => {
                self.bill_items.retain(|item| item.bill_id != *bill_id);
                Ok(Change::BillItemsRemoved { bill_id: *bill_id })
            }
            Mutation::InsertPayment(payment) => {
                if !self.bills.iter().any(|b| b.id == payment.bill_id) {
                    return Err(DatabaseError::not_found("Bill", payment.bill_id));
                }
                if self
                    .payments
                    .iter()
                    .any(|p| p.id == payment.id || p.payment_number == payment.payment_number)
                {
                    return Err(duplicate("payment", payment.id));
                }
                self.payments.push(payment.clone());
                Ok(Change::Payment(payment.clone()))
            }
            Mutation::ApplyPayment { bill_id, amount } => {
                let bill = self
                    .bills
                    .iter_mut()
                    .find(|b| b.id == *bill_id)
                    .ok_or(DatabaseError::not_found("Bill", *bill_id))?;
                *bill = bill.with_payment_applied(*amount);
                Ok(Change::Bill(bill.clone()))
            }
            Mutation::InsertForm(form) => {
                let table = match form.kind {
                    FormKind::Monitoring => &mut self.patient_forms,
                    FormKind::OperationTheatre => &mut self.ot_forms,
                };
                table.push(form.clone());
                Ok(Change::Form(form.clone()))
            }
        }
    }
}

fn sequence_value(counter: &AtomicU64, prefix: &str) -> String {
    let next = counter.fetch_add(1, Ordering::SeqCst) + 1;
    format!("{prefix}-{}-{next:06}", Utc::now().year())
}

#[async_trait]
impl WardStore for InMemoryStore {
    async fn get_ward(&self, id: Uuid) -> DatabaseResult<Ward> {
        self.tables
            .read()
            .wards
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or(DatabaseError::not_found("Ward", id))
    }

    async fn list_wards(&self) -> DatabaseResult<Vec<Ward>> {
        Ok(self.tables.read().wards.clone())
    }

    async fn get_patient(&self, id: Uuid) -> DatabaseResult<Patient> {
        self.tables
            .read()
            .patients
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(DatabaseError::not_found("Patient", id))
    }

    async fn list_patients(&self) -> DatabaseResult<Vec<Patient>> {
        let mut patients = self.tables.read().patients.clone();
        patients.sort_by(|a, b| b.admission_date.cmp(&a.admission_date));
        Ok(patients)
    }

    async fn get_staff(&self, id: Uuid) -> DatabaseResult<StaffMember> {
        self.tables
            .read()
            .staff
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(DatabaseError::not_found("Staff member", id))
    }

    async fn list_staff(&self) -> DatabaseResult<Vec<StaffMember>> {
        let mut staff = self.tables.read().staff.clone();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(staff)
    }

    async fn list_doctors(&self) -> DatabaseResult<Vec<Doctor>> {
        let mut doctors = self.tables.read().doctors.clone();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    async fn get_transfer(&self, id: Uuid) -> DatabaseResult<WardTransfer> {
        self.tables
            .read()
            .transfers
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(DatabaseError::not_found("Transfer", id))
    }

    async fn list_transfers(&self) -> DatabaseResult<Vec<WardTransfer>> {
        let mut transfers = self.tables.read().transfers.clone();
        transfers.sort_by(|a, b| b.transfer_date.cmp(&a.transfer_date));
        Ok(transfers)
    }

    async fn get_bill(&self, id: Uuid) -> DatabaseResult<Bill> {
        self.tables
            .read()
            .bills
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(DatabaseError::not_found("Bill", id))
    }

    async fn list_bills(&self) -> DatabaseResult<Vec<Bill>> {
        let mut bills = self.tables.read().bills.clone();
        bills.sort_by(|a, b| {
            b.bill_date
                .cmp(&a.bill_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(bills)
    }

    async fn list_bill_items(&self, bill_id: Option<Uuid>) -> DatabaseResult<Vec<BillItem>> {
        let mut items: Vec<BillItem> = self
            .tables
            .read()
            .bill_items
            .iter()
            .filter(|item| bill_id.map_or(true, |id| item.bill_id == id))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.bill_id.cmp(&b.bill_id));
        Ok(items)
    }

    async fn list_payments(&self, bill_id: Option<Uuid>) -> DatabaseResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .tables
            .read()
            .payments
            .iter()
            .filter(|payment| bill_id.map_or(true, |id| payment.bill_id == id))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }

    async fn list_forms(&self, kind: FormKind) -> DatabaseResult<Vec<FormRecord>> {
        let tables = self.tables.read();
        let mut forms = match kind {
            FormKind::Monitoring => tables.patient_forms.clone(),
            FormKind::OperationTheatre => tables.ot_forms.clone(),
        };
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(forms)
    }

    async fn next_bill_number(&self, prefix: &str) -> DatabaseResult<String> {
        Ok(sequence_value(&self.bill_sequence, prefix))
    }

    async fn next_payment_number(&self, prefix: &str) -> DatabaseResult<String> {
        Ok(sequence_value(&self.payment_sequence, prefix))
    }

    async fn apply(&self, mutation: &Mutation) -> DatabaseResult<Change> {
        self.tables.write().apply(mutation)
    }

    async fn apply_all(&self, mutations: &[Mutation]) -> DatabaseResult<Vec<Change>> {
        let mut tables = self.tables.write();
        let mut staged = tables.clone();
        let changes = mutations
            .iter()
            .map(|mutation| staged.apply(mutation))
            .collect::<DatabaseResult<Vec<_>>>()?;
        *tables = staged;
        Ok(changes)
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn ward(total: i32, occupied: i32) -> Ward {
        Ward {
            id: Uuid::new_v4(),
            name: "ICU Ward".to_string(),
            floor: "2".to_string(),
            total_beds: total,
            occupied_beds: occupied,
            available_beds: total - occupied,
            department: "Critical Care".to_string(),
            nurse_in_charge: "Michael Chen".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn adjust_beds_reads_the_stored_row() {
        let store = InMemoryStore::new();
        let icu = ward(10, 8);
        store.apply(&Mutation::InsertWard(icu.clone())).await.unwrap();

        let change = store
            .apply(&Mutation::AdjustBeds { ward_id: icu.id, direction: BedDirection::Increment })
            .await
            .unwrap();
        assert!(matches!(change, Change::Ward(ref w) if w.occupied_beds == 9 && w.available_beds == 1));
        assert_eq!(store.get_ward(icu.id).await.unwrap().occupied_beds, 9);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .apply(&Mutation::AdjustBeds { ward_id: Uuid::new_v4(), direction: BedDirection::Decrement })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { entity: "Ward", .. }));
        assert!(store.get_bill(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn apply_all_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let general = ward(20, 15);
        store.apply(&Mutation::InsertWard(general.clone())).await.unwrap();

        let result = store
            .apply_all(&[
                Mutation::AdjustBeds { ward_id: general.id, direction: BedDirection::Decrement },
                Mutation::AdjustBeds { ward_id: Uuid::new_v4(), direction: BedDirection::Increment },
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(store.get_ward(general.id).await.unwrap().occupied_beds, 15);
    }

    #[tokio::test]
    async fn apply_payment_for_missing_bill_fails() {
        let store = InMemoryStore::new();
        let result = store
            .apply(&Mutation::ApplyPayment { bill_id: Uuid::new_v4(), amount: Decimal::ONE_HUNDRED })
            .await;
        assert!(matches!(result, Err(DatabaseError::NotFound { entity: "Bill", .. })));
    }

    #[tokio::test]
    async fn sequences_are_unique_and_prefixed() {
        let store = InMemoryStore::new();
        let first = store.next_bill_number("BILL").await.unwrap();
        let second = store.next_bill_number("BILL").await.unwrap();
        assert!(first.starts_with("BILL-"));
        assert!(first.ends_with("000001"));
        assert_ne!(first, second);
        assert!(store.next_payment_number("PAY").await.unwrap().ends_with("000001"));
    }

    #[tokio::test]
    async fn doctors_are_listed_by_name() {
        let store = InMemoryStore::new().with_doctors(vec![
            Doctor { id: Uuid::new_v4(), name: "Dr. Smith".to_string(), specialization: None, department: None },
            Doctor { id: Uuid::new_v4(), name: "Dr. Johnson".to_string(), specialization: None, department: None },
        ]);
        let names: Vec<String> = store.list_doctors().await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Dr. Johnson", "Dr. Smith"]);
    }
}
