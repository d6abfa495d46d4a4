use chrono::Utc;
use config_engine::OverpaymentPolicy;
use database_layer::{Applied, Bill, BillStatus, ChangeSet, Mutation, Payment};
use error_common::RequestValidation;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};
use crate::models::{NewPayment, PaymentReceipt};
use crate::service::BillingService;

/// Amount that will actually be applied to `bill` for a requested payment.
///
/// Cancelled bills and bills with nothing outstanding take no payments.
/// Amounts above the balance follow the overpayment policy.
pub fn settle_amount(bill: &Bill, requested: Decimal, policy: OverpaymentPolicy) -> BillingResult<Decimal> {
    if requested <= Decimal::ZERO {
        return Err(BillingError::Validation("Payment amount must be greater than zero".to_string()));
    }
    if bill.status == BillStatus::Cancelled {
        return Err(BillingError::InvalidTransition(format!(
            "bill {} is cancelled and cannot take payments",
            bill.bill_number
        )));
    }
    if bill.is_settled() {
        return Err(BillingError::InvalidTransition(format!(
            "bill {} is already fully paid",
            bill.bill_number
        )));
    }
    if requested <= bill.balance_amount {
        return Ok(requested);
    }

    match policy {
        OverpaymentPolicy::Reject => Err(BillingError::Validation(format!(
            "Payment of {} exceeds outstanding balance of {}",
            requested.round_dp(2),
            bill.balance_amount.round_dp(2)
        ))),
        OverpaymentPolicy::Clamp => Ok(bill.balance_amount),
        OverpaymentPolicy::Allow => Ok(requested),
    }
}

impl BillingService {
    /// Record a payment and apply it to the owning bill
    pub async fn record_payment(&self, request: NewPayment) -> BillingResult<Applied<PaymentReceipt>> {
        request.validate()?;
        let bill = self.store().get_bill(request.bill_id).await?;
        let amount = settle_amount(&bill, request.amount, self.overpayment).map_err(|e| {
            warn!(bill_id = %bill.id, requested = %request.amount, error = %e, "Payment rejected");
            e
        })?;
        if amount != request.amount {
            info!(bill_id = %bill.id, requested = %request.amount, applied = %amount, "Payment clamped to balance");
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            bill_id: bill.id,
            patient_id: bill.patient_id,
            payment_number: self.numbers.payment_number().await,
            amount,
            payment_method: request.payment_method,
            transaction_id: request.transaction_id,
            reference_number: request.reference_number,
            notes: request.notes,
            received_by: request.received_by,
            payment_date: Utc::now(),
        };
        if let Some(notes) = &payment.notes {
            debug!(payment_number = %payment.payment_number, notes = %self.redactor.redact(notes), "Payment notes");
        }

        let changes = ChangeSet::new("record_payment")
            .with(Mutation::InsertPayment(payment.clone()))
            .with(Mutation::ApplyPayment { bill_id: bill.id, amount });
        let patch = self.transactions.execute(changes).await?;

        let bill = patch
            .bill(bill.id)
            .cloned()
            .unwrap_or_else(|| bill.with_payment_applied(amount));
        info!(
            bill_id = %bill.id,
            payment_number = %payment.payment_number,
            amount = %amount,
            balance = %bill.balance_amount,
            payment_status = %bill.payment_status,
            "Payment recorded"
        );
        Ok(Applied::new(PaymentReceipt { payment, bill }, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillItemInput, NewBill};
    use chrono::{NaiveDate, Utc};
    use config_engine::{BillingSettings, ConsistencyMode, Policies};
    use database_layer::{
        BillItemType, InMemoryStore, Patient, PatientStatus, PaymentMethod, PaymentStatus, TransactionManager,
        WardStore,
    };
    use std::sync::Arc;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    async fn billed(policy: OverpaymentPolicy) -> (BillingService, Bill) {
        let store = Arc::new(InMemoryStore::new());
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Jane Smith".to_string(),
            age: 32,
            gender: "Female".to_string(),
            ward_id: None,
            bed_number: None,
            admission_date: Utc::now(),
            discharge_date: None,
            diagnosis: "Post-operative care".to_string(),
            status: PatientStatus::Stable,
            doctor: "Dr. Johnson".to_string(),
            emergency_contact: "+1-555-0102".to_string(),
            blood_group: "A+".to_string(),
        };
        store.apply(&Mutation::InsertPatient(patient.clone())).await.unwrap();

        let policies = Policies {
            overpayment: policy,
            ..Policies::default()
        };
        let service = BillingService::new(
            TransactionManager::new(store, ConsistencyMode::Transactional),
            &policies,
            &BillingSettings::default(),
        );
        let bill = service
            .create_bill(NewBill {
                patient_id: patient.id,
                items: vec![
                    BillItemInput {
                        item_type: BillItemType::RoomCharges,
                        item_name: "Private room".to_string(),
                        description: None,
                        quantity: dec("2"),
                        unit_price: dec("100"),
                    },
                    BillItemInput {
                        item_type: BillItemType::Medication,
                        item_name: "Antibiotics".to_string(),
                        description: None,
                        quantity: dec("1"),
                        unit_price: dec("50"),
                    },
                ],
                tax_percentage: Some(dec("10")),
                discount_percentage: Some(dec("5")),
                bill_date: NaiveDate::from_ymd_opt(2024, 1, 20),
                admission_date: None,
                discharge_date: None,
                due_date: None,
                notes: None,
                created_by: "Billing Desk".to_string(),
            })
            .await
            .unwrap()
            .value;
        (service, bill)
    }

    fn payment(bill_id: Uuid, amount: &str) -> NewPayment {
        NewPayment {
            bill_id,
            amount: dec(amount),
            payment_method: PaymentMethod::Upi,
            transaction_id: Some("UPI-88231".to_string()),
            reference_number: None,
            notes: Some("Paid by son, call 9876543210".to_string()),
            received_by: "Cashier".to_string(),
        }
    }

    #[tokio::test]
    async fn two_payments_settle_the_reference_bill() {
        let (service, bill) = billed(OverpaymentPolicy::Reject).await;

        let first = service.record_payment(payment(bill.id, "100")).await.unwrap().value;
        assert_eq!(first.bill.paid_amount, dec("100"));
        assert_eq!(first.bill.balance_amount, dec("162.5"));
        assert_eq!(first.bill.payment_status, PaymentStatus::PartiallyPaid);
        assert!(first.payment.payment_number.starts_with("PAY-"));

        let second = service.record_payment(payment(bill.id, "162.5")).await.unwrap().value;
        assert_eq!(second.bill.paid_amount, dec("262.5"));
        assert_eq!(second.bill.balance_amount, Decimal::ZERO);
        assert_eq!(second.bill.payment_status, PaymentStatus::Paid);

        assert_eq!(service.store().list_payments(Some(bill.id)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn fully_paid_bill_rejects_further_payments() {
        let (service, bill) = billed(OverpaymentPolicy::Allow).await;
        service.record_payment(payment(bill.id, "262.5")).await.unwrap();

        let err = service.record_payment(payment(bill.id, "1")).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn overpayment_follows_policy() {
        let (rejecting, bill) = billed(OverpaymentPolicy::Reject).await;
        assert!(matches!(
            rejecting.record_payment(payment(bill.id, "300")).await,
            Err(BillingError::Validation(_))
        ));

        let (clamping, bill) = billed(OverpaymentPolicy::Clamp).await;
        let receipt = clamping.record_payment(payment(bill.id, "300")).await.unwrap().value;
        assert_eq!(receipt.payment.amount, dec("262.5"));
        assert_eq!(receipt.bill.payment_status, PaymentStatus::Paid);

        let (allowing, bill) = billed(OverpaymentPolicy::Allow).await;
        let receipt = allowing.record_payment(payment(bill.id, "300")).await.unwrap().value;
        assert_eq!(receipt.bill.balance_amount, dec("-37.5"));
        assert_eq!(receipt.bill.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn finalized_bills_take_payments_cancelled_do_not() {
        let (service, bill) = billed(OverpaymentPolicy::Reject).await;
        service.finalize_bill(bill.id).await.unwrap();
        assert!(service.record_payment(payment(bill.id, "10")).await.is_ok());

        let (service, bill) = billed(OverpaymentPolicy::Reject).await;
        service.cancel_bill(bill.id).await.unwrap();
        assert!(matches!(
            service.record_payment(payment(bill.id, "10")).await,
            Err(BillingError::InvalidTransition(_))
        ));
    }

    #[test]
    fn non_positive_amounts_are_invalid() {
        let bill = Bill {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            bill_number: "BILL-1".to_string(),
            bill_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            admission_date: None,
            discharge_date: None,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            subtotal: dec("100"),
            tax_percentage: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount: dec("100"),
            paid_amount: Decimal::ZERO,
            balance_amount: dec("100"),
            status: BillStatus::Draft,
            payment_status: PaymentStatus::Unpaid,
            notes: None,
            created_by: "Billing Desk".to_string(),
            created_at: Utc::now(),
        };
        assert!(settle_amount(&bill, Decimal::ZERO, OverpaymentPolicy::Allow).is_err());
        assert!(settle_amount(&bill, dec("-5"), OverpaymentPolicy::Allow).is_err());
        assert_eq!(settle_amount(&bill, dec("40"), OverpaymentPolicy::Reject).unwrap(), dec("40"));
    }
}
