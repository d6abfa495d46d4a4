use database_layer::{Bill, BillStatus, PaymentStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Billing reports
pub struct BillingReports;

/// Collection totals across bills; cancelled bills are left out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingSummary {
    pub bill_count: usize,
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    /// Bill count per payment status label
    pub by_payment_status: BTreeMap<String, usize>,
}

impl BillingReports {
    pub fn summary(bills: &[Bill]) -> BillingSummary {
        let mut by_payment_status: BTreeMap<String, usize> = PaymentStatus::ALL
            .iter()
            .map(|status| (status.to_string(), 0))
            .collect();
        let mut summary = BillingSummary {
            bill_count: 0,
            total_billed: Decimal::ZERO,
            total_collected: Decimal::ZERO,
            total_outstanding: Decimal::ZERO,
            by_payment_status: BTreeMap::new(),
        };

        for bill in bills.iter().filter(|bill| bill.status != BillStatus::Cancelled) {
            summary.bill_count += 1;
            summary.total_billed += bill.total_amount;
            summary.total_collected += bill.paid_amount;
            summary.total_outstanding += bill.balance_amount.max(Decimal::ZERO);
            *by_payment_status.entry(bill.payment_status.to_string()).or_insert(0) += 1;
        }

        summary.by_payment_status = by_payment_status;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn bill(total: i64, paid: i64, status: BillStatus) -> Bill {
        let total_amount = Decimal::from(total);
        let paid_amount = Decimal::from(paid);
        let balance_amount = total_amount - paid_amount;
        Bill {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            bill_number: format!("BILL-{total}-{paid}"),
            bill_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            admission_date: None,
            discharge_date: None,
            due_date: NaiveDate::from_ymd_opt(2024, 2, 19).unwrap(),
            subtotal: total_amount,
            tax_percentage: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            discount_percentage: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            total_amount,
            paid_amount,
            balance_amount,
            status,
            payment_status: PaymentStatus::derive(paid_amount, balance_amount),
            notes: None,
            created_by: "Billing Desk".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn summary_skips_cancelled_bills() {
        let bills = vec![
            bill(1000, 0, BillStatus::Draft),
            bill(500, 200, BillStatus::Finalized),
            bill(300, 300, BillStatus::Finalized),
            bill(999, 0, BillStatus::Cancelled),
        ];
        let summary = BillingReports::summary(&bills);

        assert_eq!(summary.bill_count, 3);
        assert_eq!(summary.total_billed, Decimal::from(1800));
        assert_eq!(summary.total_collected, Decimal::from(500));
        assert_eq!(summary.total_outstanding, Decimal::from(1300));
        assert_eq!(summary.by_payment_status["Unpaid"], 1);
        assert_eq!(summary.by_payment_status["Partially Paid"], 1);
        assert_eq!(summary.by_payment_status["Paid"], 1);
        assert_eq!(summary.by_payment_status["Overdue"], 0);
    }
}
