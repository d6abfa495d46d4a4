use chrono::{Days, NaiveDate, Utc};
use config_engine::{BillingSettings, OverpaymentPolicy, Policies};
use database_layer::{
    Applied, Bill, BillItem, BillStatus, ChangeSet, Mutation, PaymentStatus, TransactionManager, WardStore,
};
use error_common::RequestValidation;
use logger_redacted::PiiRedactor;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::models::*;
use crate::numbering::DocumentNumbers;
use crate::totals::compute_totals;

/// Billing service: bill lifecycle and payment application
#[derive(Clone)]
pub struct BillingService {
    pub(crate) transactions: TransactionManager,
    pub(crate) numbers: DocumentNumbers,
    pub(crate) overpayment: OverpaymentPolicy,
    pub(crate) redactor: PiiRedactor,
    default_due_days: u32,
}

fn item_rows(bill_id: Uuid, items: &[BillItemInput]) -> Vec<BillItem> {
    let created_at = Utc::now();
    items
        .iter()
        .map(|item| BillItem {
            id: Uuid::new_v4(),
            bill_id,
            item_type: item.item_type,
            item_name: item.item_name.trim().to_string(),
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            amount: item.amount(),
            created_at,
        })
        .collect()
}

pub(crate) fn require_draft(bill: &Bill, action: &str) -> BillingResult<()> {
    if bill.status != BillStatus::Draft {
        warn!(bill_id = %bill.id, status = %bill.status, action, "Rejected bill transition");
        return Err(BillingError::InvalidTransition(format!(
            "cannot {action} bill {} while it is {}",
            bill.bill_number, bill.status
        )));
    }
    Ok(())
}

impl BillingService {
    pub fn new(transactions: TransactionManager, policies: &Policies, settings: &BillingSettings) -> Self {
        let numbers = DocumentNumbers::new(
            transactions.store().clone(),
            settings.bill_number_prefix.clone(),
            settings.payment_number_prefix.clone(),
        );
        Self {
            transactions,
            numbers,
            overpayment: policies.overpayment,
            redactor: PiiRedactor::default(),
            default_due_days: settings.default_due_days,
        }
    }

    /// Use the process-wide redactor (e.g. one with redaction disabled)
    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub(crate) fn store(&self) -> &Arc<dyn WardStore> {
        self.transactions.store()
    }

    /// Create a draft bill with its items
    pub async fn create_bill(&self, request: NewBill) -> BillingResult<Applied<Bill>> {
        request.validate()?;
        self.store().get_patient(request.patient_id).await?;

        let totals = compute_totals(
            &request.items,
            request.tax_percentage.unwrap_or_default(),
            request.discount_percentage.unwrap_or_default(),
        );
        let bill_date = request.bill_date.unwrap_or_else(|| Utc::now().date_naive());
        let due_date = request
            .due_date
            .or_else(|| bill_date.checked_add_days(Days::new(u64::from(self.default_due_days))))
            .unwrap_or(bill_date);

        let bill = Bill {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            bill_number: self.numbers.bill_number().await,
            bill_date,
            admission_date: request.admission_date,
            discharge_date: request.discharge_date,
            due_date,
            subtotal: totals.subtotal,
            tax_percentage: request.tax_percentage.unwrap_or_default(),
            tax_amount: totals.tax_amount,
            discount_percentage: request.discount_percentage.unwrap_or_default(),
            discount_amount: totals.discount_amount,
            total_amount: totals.total_amount,
            paid_amount: Decimal::ZERO,
            balance_amount: totals.total_amount,
            status: BillStatus::Draft,
            payment_status: PaymentStatus::derive(Decimal::ZERO, totals.total_amount),
            notes: request.notes,
            created_by: request.created_by,
            created_at: Utc::now(),
        };

        let mut changes = ChangeSet::new("create_bill").with(Mutation::InsertBill(bill.clone()));
        changes.extend(item_rows(bill.id, &request.items).into_iter().map(Mutation::InsertBillItem));
        let patch = self.transactions.execute(changes).await?;

        info!(
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            patient_id = %bill.patient_id,
            total = %bill.total_amount,
            "Bill created"
        );
        let bill = patch.bill(bill.id).cloned().unwrap_or(bill);
        Ok(Applied::new(bill, patch))
    }

    /// Recompute a draft bill from an edited item list.
    ///
    /// Payments already recorded stay counted: balance = new total - paid.
    pub async fn update_bill(&self, bill_id: Uuid, update: BillUpdate) -> BillingResult<Applied<Bill>> {
        update.validate()?;
        let current = self.store().get_bill(bill_id).await?;
        require_draft(&current, "update")?;

        let tax_percentage = update.tax_percentage.unwrap_or_default();
        let discount_percentage = update.discount_percentage.unwrap_or_default();
        let totals = compute_totals(&update.items, tax_percentage, discount_percentage);
        let balance_amount = totals.total_amount - current.paid_amount;
        let payment_status = PaymentStatus::derive(current.paid_amount, balance_amount);

        let bill = Bill {
            subtotal: totals.subtotal,
            tax_percentage,
            tax_amount: totals.tax_amount,
            discount_percentage,
            discount_amount: totals.discount_amount,
            total_amount: totals.total_amount,
            balance_amount,
            payment_status,
            admission_date: update.admission_date.or(current.admission_date),
            discharge_date: update.discharge_date.or(current.discharge_date),
            due_date: update.due_date.unwrap_or(current.due_date),
            notes: update.notes.or(current.notes.clone()),
            ..current
        };

        let mut changes = ChangeSet::new("update_bill")
            .with(Mutation::UpdateBill(bill.clone()))
            .with(Mutation::DeleteBillItems { bill_id });
        changes.extend(item_rows(bill_id, &update.items).into_iter().map(Mutation::InsertBillItem));
        let patch = self.transactions.execute(changes).await?;

        info!(bill_id = %bill_id, total = %bill.total_amount, balance = %bill.balance_amount, "Bill updated");
        let bill = patch.bill(bill_id).cloned().unwrap_or(bill);
        Ok(Applied::new(bill, patch))
    }

    pub async fn finalize_bill(&self, bill_id: Uuid) -> BillingResult<Applied<Bill>> {
        self.set_status(bill_id, BillStatus::Finalized, "finalize").await
    }

    pub async fn cancel_bill(&self, bill_id: Uuid) -> BillingResult<Applied<Bill>> {
        self.set_status(bill_id, BillStatus::Cancelled, "cancel").await
    }

    async fn set_status(&self, bill_id: Uuid, status: BillStatus, action: &str) -> BillingResult<Applied<Bill>> {
        let current = self.store().get_bill(bill_id).await?;
        require_draft(&current, action)?;

        let bill = Bill { status, ..current };
        let patch = self
            .transactions
            .execute(ChangeSet::new(format!("{action}_bill")).with(Mutation::UpdateBill(bill.clone())))
            .await?;

        info!(bill_id = %bill_id, status = %status, "Bill status changed");
        Ok(Applied::new(bill, patch))
    }

    /// Delete a draft bill that has no payments
    pub async fn delete_bill(&self, bill_id: Uuid) -> BillingResult<Applied<Uuid>> {
        let current = self.store().get_bill(bill_id).await?;
        require_draft(&current, "delete")?;
        if !self.store().list_payments(Some(bill_id)).await?.is_empty() || current.paid_amount > Decimal::ZERO {
            warn!(bill_id = %bill_id, "Rejected deletion of bill with payments");
            return Err(BillingError::InvalidTransition(format!(
                "cannot delete bill {} after payments were recorded",
                current.bill_number
            )));
        }

        let patch = self
            .transactions
            .execute(ChangeSet::new("delete_bill").with(Mutation::DeleteBill(bill_id)))
            .await?;

        info!(bill_id = %bill_id, "Bill deleted");
        Ok(Applied::new(bill_id, patch))
    }

    pub async fn bill_items(&self, bill_id: Uuid) -> BillingResult<Vec<BillItem>> {
        self.store().get_bill(bill_id).await?;
        Ok(self.store().list_bill_items(Some(bill_id)).await?)
    }

    /// Flag bills past their due date with an outstanding balance as Overdue
    pub async fn mark_overdue_bills(&self, today: NaiveDate) -> BillingResult<Applied<Vec<Bill>>> {
        let overdue: Vec<Bill> = self
            .store()
            .list_bills()
            .await?
            .into_iter()
            .filter(|bill| {
                bill.status != BillStatus::Cancelled
                    && bill.due_date < today
                    && bill.balance_amount > Decimal::ZERO
                    && bill.payment_status != PaymentStatus::Overdue
            })
            .map(|bill| Bill {
                payment_status: PaymentStatus::Overdue,
                ..bill
            })
            .collect();

        let mut changes = ChangeSet::new("mark_overdue_bills");
        changes.extend(overdue.iter().cloned().map(Mutation::UpdateBill));
        let patch = self.transactions.execute(changes).await?;

        if !overdue.is_empty() {
            info!(count = overdue.len(), %today, "Bills marked overdue");
        }
        Ok(Applied::new(overdue, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use config_engine::ConsistencyMode;
    use database_layer::{BillItemType, InMemoryStore, Patient, PatientStatus};

    async fn service_with_patient() -> (BillingService, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "John Doe".to_string(),
            age: 45,
            gender: "Male".to_string(),
            ward_id: None,
            bed_number: None,
            admission_date: Utc::now(),
            discharge_date: None,
            diagnosis: "Pneumonia".to_string(),
            status: PatientStatus::Admitted,
            doctor: "Dr. Smith".to_string(),
            emergency_contact: "+1-555-0101".to_string(),
            blood_group: "O+".to_string(),
        };
        store.apply(&Mutation::InsertPatient(patient.clone())).await.unwrap();
        let transactions = TransactionManager::new(store, ConsistencyMode::Transactional);
        let service = BillingService::new(transactions, &Policies::default(), &BillingSettings::default());
        (service, patient.id)
    }

    fn item(item_type: BillItemType, quantity: i64, price: i64) -> BillItemInput {
        BillItemInput {
            item_type,
            item_name: item_type.to_string(),
            description: None,
            quantity: Decimal::from(quantity),
            unit_price: Decimal::from(price),
        }
    }

    fn reference_bill(patient_id: Uuid) -> NewBill {
        NewBill {
            patient_id,
            items: vec![item(BillItemType::RoomCharges, 2, 100), item(BillItemType::Consultation, 1, 50)],
            tax_percentage: Some(Decimal::from(10)),
            discount_percentage: Some(Decimal::from(5)),
            bill_date: NaiveDate::from_ymd_opt(2024, 1, 20),
            admission_date: None,
            discharge_date: None,
            due_date: None,
            notes: None,
            created_by: "Billing Desk".to_string(),
        }
    }

    #[tokio::test]
    async fn create_bill_computes_totals_and_items() {
        let (service, patient_id) = service_with_patient().await;
        let created = service.create_bill(reference_bill(patient_id)).await.unwrap();
        let bill = created.value;

        assert_eq!(bill.total_amount, "262.5".parse::<Decimal>().unwrap());
        assert_eq!(bill.balance_amount, bill.total_amount);
        assert_eq!(bill.paid_amount, Decimal::ZERO);
        assert_eq!(bill.status, BillStatus::Draft);
        assert_eq!(bill.payment_status, PaymentStatus::Unpaid);
        assert_eq!(bill.due_date, NaiveDate::from_ymd_opt(2024, 2, 19).unwrap());
        assert!(bill.bill_number.starts_with("BILL-"));
        assert_eq!(created.patch.bill_items().len(), 2);
        assert_eq!(service.bill_items(bill.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_bill_for_unknown_patient_is_not_found() {
        let (service, _) = service_with_patient().await;
        let err = service.create_bill(reference_bill(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(error_common::Classify::kind(&err), error_common::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn update_replaces_items_and_keeps_payments() {
        let (service, patient_id) = service_with_patient().await;
        let bill = service.create_bill(reference_bill(patient_id)).await.unwrap().value;
        service
            .store()
            .apply(&Mutation::ApplyPayment { bill_id: bill.id, amount: Decimal::from(100) })
            .await
            .unwrap();

        let update = BillUpdate {
            items: vec![item(BillItemType::Surgery, 1, 500)],
            tax_percentage: None,
            discount_percentage: None,
            admission_date: None,
            discharge_date: None,
            due_date: None,
            notes: Some("Revised after surgery".to_string()),
        };
        let updated = service.update_bill(bill.id, update).await.unwrap().value;

        assert_eq!(updated.total_amount, Decimal::from(500));
        assert_eq!(updated.paid_amount, Decimal::from(100));
        assert_eq!(updated.balance_amount, Decimal::from(400));
        assert_eq!(updated.payment_status, PaymentStatus::PartiallyPaid);
        let items = service.bill_items(bill.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, BillItemType::Surgery);
    }

    #[tokio::test]
    async fn finalized_bills_are_immutable() {
        let (service, patient_id) = service_with_patient().await;
        let bill = service.create_bill(reference_bill(patient_id)).await.unwrap().value;
        let finalized = service.finalize_bill(bill.id).await.unwrap().value;
        assert_eq!(finalized.status, BillStatus::Finalized);

        let update = BillUpdate {
            items: vec![item(BillItemType::Other, 1, 1)],
            tax_percentage: None,
            discount_percentage: None,
            admission_date: None,
            discharge_date: None,
            due_date: None,
            notes: None,
        };
        assert!(matches!(service.update_bill(bill.id, update).await, Err(BillingError::InvalidTransition(_))));
        assert!(matches!(service.finalize_bill(bill.id).await, Err(BillingError::InvalidTransition(_))));
        assert!(matches!(service.cancel_bill(bill.id).await, Err(BillingError::InvalidTransition(_))));
        assert!(matches!(service.delete_bill(bill.id).await, Err(BillingError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn draft_bill_can_be_deleted() {
        let (service, patient_id) = service_with_patient().await;
        let bill = service.create_bill(reference_bill(patient_id)).await.unwrap().value;
        service.delete_bill(bill.id).await.unwrap();
        assert!(service.store().get_bill(bill.id).await.is_err());
        assert!(service.store().list_bill_items(Some(bill.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overdue_sweep_flags_unpaid_bills_past_due() {
        let (service, patient_id) = service_with_patient().await;
        let bill = service.create_bill(reference_bill(patient_id)).await.unwrap().value;

        let before_due = service.mark_overdue_bills(bill.due_date).await.unwrap();
        assert!(before_due.value.is_empty());

        let later = bill.due_date.succ_opt().unwrap();
        let swept = service.mark_overdue_bills(later).await.unwrap();
        assert_eq!(swept.value.len(), 1);
        assert_eq!(service.store().get_bill(bill.id).await.unwrap().payment_status, PaymentStatus::Overdue);

        assert!(service.mark_overdue_bills(later).await.unwrap().value.is_empty());
    }

    #[tokio::test]
    async fn zero_total_bill_is_paid_from_the_start() {
        let (service, patient_id) = service_with_patient().await;
        let request = NewBill {
            items: vec![item(BillItemType::Consultation, 0, 100)],
            tax_percentage: None,
            discount_percentage: None,
            ..reference_bill(patient_id)
        };
        let bill = service.create_bill(request).await.unwrap().value;

        assert_eq!(bill.total_amount, Decimal::ZERO);
        assert_eq!(bill.balance_amount, Decimal::ZERO);
        assert_eq!(bill.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn update_rederives_status_without_payments() {
        let (service, patient_id) = service_with_patient().await;
        let bill = service.create_bill(reference_bill(patient_id)).await.unwrap().value;
        let swept = service.mark_overdue_bills(bill.due_date.succ_opt().unwrap()).await.unwrap();
        assert_eq!(swept.value.len(), 1);

        let update = BillUpdate {
            items: vec![item(BillItemType::Other, 1, 40)],
            tax_percentage: None,
            discount_percentage: None,
            admission_date: None,
            discharge_date: None,
            due_date: None,
            notes: None,
        };
        let updated = service.update_bill(bill.id, update).await.unwrap().value;
        assert_eq!(updated.payment_status, PaymentStatus::Unpaid);

        let emptied = BillUpdate {
            items: vec![item(BillItemType::Other, 0, 40)],
            tax_percentage: None,
            discount_percentage: None,
            admission_date: None,
            discharge_date: None,
            due_date: None,
            notes: None,
        };
        let updated = service.update_bill(bill.id, emptied).await.unwrap().value;
        assert_eq!(updated.balance_amount, Decimal::ZERO);
        assert_eq!(updated.payment_status, PaymentStatus::Paid);
    }
}
