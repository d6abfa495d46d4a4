use chrono::NaiveDate;
use database_layer::{Bill, BillItemType, Payment, PaymentMethod};
use error_common::{validate_field, validate_required, RequestValidation, ValidationFailure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Line item as entered on a bill form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItemInput {
    pub item_type: BillItemType,
    pub item_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl BillItemInput {
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Request to create a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBill {
    pub patient_id: Uuid,
    pub items: Vec<BillItemInput>,
    /// Blank means 0
    #[serde(default)]
    pub tax_percentage: Option<Decimal>,
    /// Blank means 0
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub bill_date: Option<NaiveDate>,
    #[serde(default)]
    pub admission_date: Option<NaiveDate>,
    #[serde(default)]
    pub discharge_date: Option<NaiveDate>,
    /// Defaults to the bill date plus the configured payment term
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
}

/// Edit of a draft bill; the item list replaces the old one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillUpdate {
    pub items: Vec<BillItemInput>,
    #[serde(default)]
    pub tax_percentage: Option<Decimal>,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub admission_date: Option<NaiveDate>,
    #[serde(default)]
    pub discharge_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request to record a payment against a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub bill_id: Uuid,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub received_by: String,
}

/// A recorded payment and the bill it was applied to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub bill: Bill,
}

fn percentage_in_range(value: Option<Decimal>) -> bool {
    value.map_or(true, |p| p >= Decimal::ZERO && p <= ONE_HUNDRED)
}

fn validate_items(items: &[BillItemInput]) -> Result<(), ValidationFailure> {
    validate_field!(items, !items.is_empty(), "A bill needs at least one item");
    for item in items {
        item.validate()?;
    }
    Ok(())
}

impl RequestValidation for BillItemInput {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_required!(self.item_name, "Item name is required");
        validate_field!(self.quantity, self.quantity >= Decimal::ZERO, "Quantity must not be negative");
        validate_field!(self.unit_price, self.unit_price >= Decimal::ZERO, "Unit price must not be negative");
        Ok(())
    }
}

impl RequestValidation for NewBill {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_items(&self.items)?;
        validate_field!(self.tax_percentage, percentage_in_range(self.tax_percentage), "Tax percentage must be between 0 and 100");
        validate_field!(
            self.discount_percentage,
            percentage_in_range(self.discount_percentage),
            "Discount percentage must be between 0 and 100"
        );
        validate_required!(self.created_by, "Created by is required");
        if let (Some(admitted), Some(discharged)) = (self.admission_date, self.discharge_date) {
            validate_field!(discharged, discharged >= admitted, "Discharge date cannot be before admission date");
        }
        Ok(())
    }
}

impl RequestValidation for BillUpdate {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_items(&self.items)?;
        validate_field!(self.tax_percentage, percentage_in_range(self.tax_percentage), "Tax percentage must be between 0 and 100");
        validate_field!(
            self.discount_percentage,
            percentage_in_range(self.discount_percentage),
            "Discount percentage must be between 0 and 100"
        );
        Ok(())
    }
}

impl RequestValidation for NewPayment {
    fn validate(&self) -> Result<(), ValidationFailure> {
        validate_field!(self.amount, self.amount > Decimal::ZERO, "Payment amount must be greater than zero");
        validate_required!(self.received_by, "Received by is required");
        Ok(())
    }
}
