// Bill totals: pure arithmetic over line items and percentages
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::BillItemInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

/// subtotal = sum(quantity * unit price); tax and discount are percentages
/// of the subtotal; total = subtotal + tax - discount. No rounding here.
pub fn compute_totals(items: &[BillItemInput], tax_percentage: Decimal, discount_percentage: Decimal) -> BillTotals {
    let subtotal: Decimal = items.iter().map(BillItemInput::amount).sum();
    let tax_amount = subtotal * tax_percentage / Decimal::ONE_HUNDRED;
    let discount_amount = subtotal * discount_percentage / Decimal::ONE_HUNDRED;

    BillTotals {
        subtotal,
        tax_amount,
        discount_amount,
        total_amount: subtotal + tax_amount - discount_amount,
    }
}

/// Round a currency amount for display
pub fn display_amount(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
