//! In-process view of the ward data.
//!
//! [`AppState`] is loaded once from the store and then kept current by
//! folding in the [`StatePatch`] every operation returns. Readers take a
//! [`StateSnapshot`], which is a consistent copy.

use database_layer::{
    Bill, BillItem, Change, DatabaseResult, Doctor, FormKind, FormRecord, Patient, Payment, StaffMember,
    StatePatch, Ward, WardStore, WardTransfer,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub wards: Vec<Ward>,
    pub patients: Vec<Patient>,
    pub staff: Vec<StaffMember>,
    pub doctors: Vec<Doctor>,
    pub transfers: Vec<WardTransfer>,
    pub bills: Vec<Bill>,
    pub bill_items: Vec<BillItem>,
    pub payments: Vec<Payment>,
    pub patient_forms: Vec<FormRecord>,
    pub ot_forms: Vec<FormRecord>,
}

fn upsert<T>(rows: &mut Vec<T>, row: T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|existing| same(existing)) {
        Some(slot) => *slot = row,
        None => rows.push(row),
    }
}

impl StateSnapshot {
    pub fn ward(&self, id: Uuid) -> Option<&Ward> {
        self.wards.iter().find(|ward| ward.id == id)
    }

    pub fn patient(&self, id: Uuid) -> Option<&Patient> {
        self.patients.iter().find(|patient| patient.id == id)
    }

    pub fn staff_member(&self, id: Uuid) -> Option<&StaffMember> {
        self.staff.iter().find(|member| member.id == id)
    }

    pub fn transfer(&self, id: Uuid) -> Option<&WardTransfer> {
        self.transfers.iter().find(|transfer| transfer.id == id)
    }

    pub fn bill(&self, id: Uuid) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    pub fn items_of(&self, bill_id: Uuid) -> Vec<BillItem> {
        self.bill_items
            .iter()
            .filter(|item| item.bill_id == bill_id)
            .cloned()
            .collect()
    }

    pub fn payments_for(&self, bill_id: Option<Uuid>) -> Vec<Payment> {
        self.payments
            .iter()
            .filter(|payment| bill_id.map_or(true, |id| payment.bill_id == id))
            .cloned()
            .collect()
    }

    pub fn forms(&self, kind: FormKind, patient_id: Option<Uuid>) -> Vec<FormRecord> {
        let table = match kind {
            FormKind::Monitoring => &self.patient_forms,
            FormKind::OperationTheatre => &self.ot_forms,
        };
        table
            .iter()
            .filter(|form| patient_id.map_or(true, |id| form.patient_id == id))
            .cloned()
            .collect()
    }

    fn fold(&mut self, change: &Change) {
        match change {
            Change::Ward(ward) => upsert(&mut self.wards, ward.clone(), |w| w.id == ward.id),
            Change::WardRemoved(id) => self.wards.retain(|w| w.id != *id),
            Change::Patient(patient) => upsert(&mut self.patients, patient.clone(), |p| p.id == patient.id),
            Change::PatientRemoved(id) => self.patients.retain(|p| p.id != *id),
            Change::Staff(member) => upsert(&mut self.staff, member.clone(), |s| s.id == member.id),
            Change::StaffRemoved(id) => self.staff.retain(|s| s.id != *id),
            Change::Transfer(transfer) => upsert(&mut self.transfers, transfer.clone(), |t| t.id == transfer.id),
            Change::TransferRemoved(id) => self.transfers.retain(|t| t.id != *id),
            Change::Bill(bill) => upsert(&mut self.bills, bill.clone(), |b| b.id == bill.id),
            Change::BillRemoved(id) => {
                self.bills.retain(|b| b.id != *id);
                self.bill_items.retain(|item| item.bill_id != *id);
                self.payments.retain(|payment| payment.bill_id != *id);
            }
            Change::BillItem(item) => upsert(&mut self.bill_items, item.clone(), |i| i.id == item.id),
            Change::BillItemsRemoved { bill_id } => self.bill_items.retain(|item| item.bill_id != *bill_id),
            Change::Payment(payment) => upsert(&mut self.payments, payment.clone(), |p| p.id == payment.id),
            Change::Form(form) => match form.kind {
                FormKind::Monitoring => upsert(&mut self.patient_forms, form.clone(), |f| f.id == form.id),
                FormKind::OperationTheatre => upsert(&mut self.ot_forms, form.clone(), |f| f.id == form.id),
            },
        }
    }

    /// Restore the load ordering of every collection
    fn sort(&mut self) {
        self.wards.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.patients.sort_by(|a, b| b.admission_date.cmp(&a.admission_date));
        self.staff.sort_by(|a, b| a.name.cmp(&b.name));
        self.doctors.sort_by(|a, b| a.name.cmp(&b.name));
        self.transfers.sort_by(|a, b| b.transfer_date.cmp(&a.transfer_date));
        self.bills.sort_by(|a, b| {
            b.bill_date
                .cmp(&a.bill_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        self.bill_items.sort_by(|a, b| a.bill_id.cmp(&b.bill_id));
        self.payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        self.patient_forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.ot_forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
}

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    inner: Arc<RwLock<StateSnapshot>>,
}

impl AppState {
    /// Fetch every collection from the store concurrently
    pub async fn load(store: &dyn WardStore) -> DatabaseResult<Self> {
        let state = Self::default();
        state.reload(store).await?;
        Ok(state)
    }

    /// Replace the held collections with a fresh read of the store
    pub async fn reload(&self, store: &dyn WardStore) -> DatabaseResult<()> {
        let (wards, patients, staff, doctors, transfers, bills, bill_items, payments, patient_forms, ot_forms) =
            tokio::try_join!(
                store.list_wards(),
                store.list_patients(),
                store.list_staff(),
                store.list_doctors(),
                store.list_transfers(),
                store.list_bills(),
                store.list_bill_items(None),
                store.list_payments(None),
                store.list_forms(FormKind::Monitoring),
                store.list_forms(FormKind::OperationTheatre),
            )?;

        let snapshot = StateSnapshot {
            wards,
            patients,
            staff,
            doctors,
            transfers,
            bills,
            bill_items,
            payments,
            patient_forms,
            ot_forms,
        };
        info!(
            wards = snapshot.wards.len(),
            patients = snapshot.patients.len(),
            bills = snapshot.bills.len(),
            "Application state loaded"
        );
        *self.inner.write() = snapshot;
        Ok(())
    }

    /// Fold an operation's changes in under one write lock
    pub fn apply(&self, patch: &StatePatch) {
        if patch.is_empty() {
            return;
        }
        let mut state = self.inner.write();
        for change in patch.changes() {
            state.fold(change);
        }
        state.sort();
        debug!(changes = patch.len(), "State patch applied");
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.inner.read().clone()
    }

    /// Run a read against the current state without copying all of it
    pub fn read<R>(&self, f: impl FnOnce(&StateSnapshot) -> R) -> R {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use database_layer::{InMemoryStore, Mutation, PatientStatus};

    fn ward(name: &str, minutes_ago: i64) -> Ward {
        Ward {
            id: Uuid::new_v4(),
            name: name.to_string(),
            floor: "1".to_string(),
            total_beds: 10,
            occupied_beds: 4,
            available_beds: 6,
            department: "General Medicine".to_string(),
            nurse_in_charge: "Sarah Johnson".to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn patient(name: &str, ward_id: Uuid, days_ago: i64) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: name.to_string(),
            age: 40,
            gender: "Female".to_string(),
            ward_id: Some(ward_id),
            bed_number: Some("A-1".to_string()),
            admission_date: Utc::now() - Duration::days(days_ago),
            discharge_date: None,
            diagnosis: "Observation".to_string(),
            status: PatientStatus::Stable,
            doctor: "Dr. Smith".to_string(),
            emergency_contact: "+1-555-0101".to_string(),
            blood_group: "B+".to_string(),
        }
    }

    #[tokio::test]
    async fn load_uses_store_ordering() {
        let store = InMemoryStore::new();
        let older = ward("General Ward A", 60);
        let newer = ward("ICU Ward", 5);
        store.apply(&Mutation::InsertWard(older.clone())).await.unwrap();
        store.apply(&Mutation::InsertWard(newer.clone())).await.unwrap();
        store.apply(&Mutation::InsertPatient(patient("First", older.id, 3))).await.unwrap();
        store.apply(&Mutation::InsertPatient(patient("Latest", older.id, 1))).await.unwrap();

        let state = AppState::load(&store).await.unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.wards.len(), 2);
        assert_eq!(snapshot.patients.first().map(|p| p.name.as_str()), Some("Latest"));
    }

    #[test]
    fn patches_upsert_remove_and_keep_order() {
        let state = AppState::default();
        let older = ward("General Ward A", 60);
        let newer = ward("ICU Ward", 5);

        let patch: StatePatch = vec![Change::Ward(newer.clone()), Change::Ward(older.clone())]
            .into_iter()
            .collect();
        state.apply(&patch);
        let names: Vec<String> = state.read(|s| s.wards.iter().map(|w| w.name.clone()).collect());
        assert_eq!(names, vec!["General Ward A", "ICU Ward"]);

        let fuller = older.with_bed_adjustment(database_layer::BedDirection::Increment);
        state.apply(&StatePatch::from(Change::Ward(fuller)));
        assert_eq!(state.read(|s| s.ward(older.id).map(|w| w.occupied_beds)), Some(5));
        assert_eq!(state.read(|s| s.wards.len()), 2);

        state.apply(&StatePatch::from(Change::WardRemoved(newer.id)));
        assert!(state.read(|s| s.ward(newer.id).is_none()));
    }
}
