//! Write requests sent to a [`WardStore`](crate::store::WardStore) and the
//! record of what they changed.
//!
//! A service builds a [`ChangeSet`] describing every write an operation
//! needs, the [`TransactionManager`](crate::transaction::TransactionManager)
//! applies it, and the resulting [`StatePatch`] is what in-process readers
//! fold into their view of the data.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::*;

/// One write against the store
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    InsertWard(Ward),
    UpdateWard(Ward),
    DeleteWard(Uuid),
    /// Take or release one bed, computed against the stored row
    AdjustBeds { ward_id: Uuid, direction: BedDirection },
    InsertPatient(Patient),
    UpdatePatient(Patient),
    DeletePatient(Uuid),
    InsertStaff(StaffMember),
    UpdateStaff(StaffMember),
    DeleteStaff(Uuid),
    InsertTransfer(WardTransfer),
    UpdateTransfer(WardTransfer),
    DeleteTransfer(Uuid),
    InsertBill(Bill),
    UpdateBill(Bill),
    /// Removes the bill together with its items
    DeleteBill(Uuid),
    InsertBillItem(BillItem),
    DeleteBillItems { bill_id: Uuid },
    InsertPayment(Payment),
    /// Add to the bill's paid amount, computed against the stored row
    ApplyPayment { bill_id: Uuid, amount: Decimal },
    InsertForm(FormRecord),
}

impl Mutation {
    /// Short label for logs
    pub fn describe(&self) -> &'static str {
        match self {
            Mutation::InsertWard(_) => "insert_ward",
            Mutation::UpdateWard(_) => "update_ward",
            Mutation::DeleteWard(_) => "delete_ward",
            Mutation::AdjustBeds { direction: BedDirection::Increment, .. } => "increment_beds",
            Mutation::AdjustBeds { direction: BedDirection::Decrement, .. } => "decrement_beds",
            Mutation::InsertPatient(_) => "insert_patient",
            Mutation::UpdatePatient(_) => "update_patient",
            Mutation::DeletePatient(_) => "delete_patient",
            Mutation::InsertStaff(_) => "insert_staff",
            Mutation::UpdateStaff(_) => "update_staff",
            Mutation::DeleteStaff(_) => "delete_staff",
            Mutation::InsertTransfer(_) => "insert_transfer",
            Mutation::UpdateTransfer(_) => "update_transfer",
            Mutation::DeleteTransfer(_) => "delete_transfer",
            Mutation::InsertBill(_) => "insert_bill",
            Mutation::UpdateBill(_) => "update_bill",
            Mutation::DeleteBill(_) => "delete_bill",
            Mutation::InsertBillItem(_) => "insert_bill_item",
            Mutation::DeleteBillItems { .. } => "delete_bill_items",
            Mutation::InsertPayment(_) => "insert_payment",
            Mutation::ApplyPayment { .. } => "apply_payment",
            Mutation::InsertForm(_) => "insert_form",
        }
    }
}

/// The stored result of one applied mutation
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Ward(Ward),
    WardRemoved(Uuid),
    Patient(Patient),
    PatientRemoved(Uuid),
    Staff(StaffMember),
    StaffRemoved(Uuid),
    Transfer(WardTransfer),
    TransferRemoved(Uuid),
    Bill(Bill),
    BillRemoved(Uuid),
    BillItem(BillItem),
    BillItemsRemoved { bill_id: Uuid },
    Payment(Payment),
    Form(FormRecord),
}

/// Named, ordered list of mutations making up one operation
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub operation: String,
    pub mutations: Vec<Mutation>,
}

impl ChangeSet {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            mutations: Vec::new(),
        }
    }

    pub fn with(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.mutations.extend(mutations);
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Every entity an operation changed, in application order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    changes: Vec<Change>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Append another patch, keeping order
    pub fn merge(&mut self, other: StatePatch) {
        self.changes.extend(other.changes);
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Latest stored version of a ward in this patch
    pub fn ward(&self, id: Uuid) -> Option<&Ward> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Ward(ward) if ward.id == id => Some(ward),
            _ => None,
        })
    }

    pub fn patient(&self, id: Uuid) -> Option<&Patient> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Patient(patient) if patient.id == id => Some(patient),
            _ => None,
        })
    }

    pub fn transfer(&self, id: Uuid) -> Option<&WardTransfer> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Transfer(transfer) if transfer.id == id => Some(transfer),
            _ => None,
        })
    }

    pub fn bill(&self, id: Uuid) -> Option<&Bill> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Bill(bill) if bill.id == id => Some(bill),
            _ => None,
        })
    }

    pub fn staff(&self, id: Uuid) -> Option<&StaffMember> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Staff(member) if member.id == id => Some(member),
            _ => None,
        })
    }

    /// Wards touched by this patch, latest version of each
    pub fn wards(&self) -> Vec<&Ward> {
        let mut seen: Vec<&Ward> = Vec::new();
        for change in self.changes.iter().rev() {
            if let Change::Ward(ward) = change {
                if !seen.iter().any(|w| w.id == ward.id) {
                    seen.push(ward);
                }
            }
        }
        seen.reverse();
        seen
    }

    pub fn bill_items(&self) -> Vec<&BillItem> {
        self.changes
            .iter()
            .filter_map(|change| match change {
                Change::BillItem(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    pub fn payment(&self) -> Option<&Payment> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Payment(payment) => Some(payment),
            _ => None,
        })
    }

    pub fn form(&self) -> Option<&FormRecord> {
        self.changes.iter().rev().find_map(|change| match change {
            Change::Form(form) => Some(form),
            _ => None,
        })
    }
}

impl From<Change> for StatePatch {
    fn from(change: Change) -> Self {
        Self {
            changes: vec![change],
        }
    }
}

impl FromIterator<Change> for StatePatch {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// An operation's result together with the writes that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub value: T,
    pub patch: StatePatch,
}

impl<T> Applied<T> {
    pub fn new(value: T, patch: StatePatch) -> Self {
        Self { value, patch }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            value: f(self.value),
            patch: self.patch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ward(id: Uuid, occupied: i32) -> Ward {
        Ward {
            id,
            name: "General Ward A".to_string(),
            floor: "1".to_string(),
            total_beds: 20,
            occupied_beds: occupied,
            available_beds: 20 - occupied,
            department: "General Medicine".to_string(),
            nurse_in_charge: "Sarah Johnson".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn merged_patch_reports_latest_ward_versions() {
        let first_id = Uuid::new_v4();
        let second_id = Uuid::new_v4();
        let mut patch: StatePatch = vec![Change::Ward(ward(first_id, 15)), Change::Ward(ward(second_id, 8))]
            .into_iter()
            .collect();
        patch.merge(StatePatch::from(Change::Ward(ward(first_id, 16))));

        assert_eq!(patch.len(), 3);
        assert_eq!(patch.ward(first_id).map(|w| w.occupied_beds), Some(16));
        let wards: Vec<_> = patch.wards().iter().map(|w| (w.id, w.occupied_beds)).collect();
        assert_eq!(wards, vec![(second_id, 8), (first_id, 16)]);
        assert!(patch.patient(first_id).is_none());
    }
}
