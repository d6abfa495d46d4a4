// Ward, patient, transfer and billing records as persisted
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Declare an enum stored as its display label (TEXT column, JSON string).
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DatabaseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(DatabaseError::Decode(format!(
                        "unknown {} value '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum! {
    /// Patient status; every value except `Discharged` occupies a bed
    PatientStatus {
        Admitted => "Admitted",
        Critical => "Critical",
        Stable => "Stable",
        Recovering => "Recovering",
        Discharged => "Discharged",
    }
}

impl PatientStatus {
    pub fn is_active(&self) -> bool {
        !matches!(self, PatientStatus::Discharged)
    }
}

text_enum! {
    TransferStatus {
        Pending => "Pending",
        Approved => "Approved",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Cancelled)
    }
}

text_enum! {
    BillStatus {
        Draft => "Draft",
        Finalized => "Finalized",
        Cancelled => "Cancelled",
    }
}

text_enum! {
    PaymentStatus {
        Unpaid => "Unpaid",
        PartiallyPaid => "Partially Paid",
        Paid => "Paid",
        Overdue => "Overdue",
    }
}

impl PaymentStatus {
    /// Status label for a bill after its paid amount changed
    pub fn derive(paid_amount: Decimal, balance_amount: Decimal) -> Self {
        if balance_amount <= Decimal::ZERO {
            PaymentStatus::Paid
        } else if paid_amount > Decimal::ZERO {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::Unpaid
        }
    }
}

text_enum! {
    BillItemType {
        RoomCharges => "Room Charges",
        Consultation => "Consultation",
        Procedure => "Procedure",
        Medication => "Medication",
        Laboratory => "Laboratory",
        Radiology => "Radiology",
        Surgery => "Surgery",
        NursingCare => "Nursing Care",
        MedicalSupplies => "Medical Supplies",
        Other => "Other",
    }
}

text_enum! {
    PaymentMethod {
        Cash => "Cash",
        CreditCard => "Credit Card",
        DebitCard => "Debit Card",
        Upi => "UPI",
        NetBanking => "Net Banking",
        Cheque => "Cheque",
        Insurance => "Insurance",
        Other => "Other",
    }
}

text_enum! {
    StaffRole {
        Doctor => "Doctor",
        Nurse => "Nurse",
        Technician => "Technician",
        Administrator => "Administrator",
    }
}

text_enum! {
    Shift {
        Morning => "Morning",
        Evening => "Evening",
        Night => "Night",
    }
}

text_enum! {
    StaffStatus {
        Active => "Active",
        OnLeave => "On Leave",
        Inactive => "Inactive",
    }
}

text_enum! {
    /// Which table a filled form lives in
    FormKind {
        Monitoring => "Monitoring",
        OperationTheatre => "OT",
    }
}

impl FormKind {
    /// Route a template category: "OT" forms go to the OT table, the rest
    /// are patient monitoring forms.
    pub fn for_form_type(form_type: &str) -> Self {
        if form_type.trim().eq_ignore_ascii_case("OT") {
            FormKind::OperationTheatre
        } else {
            FormKind::Monitoring
        }
    }
}

/// Bed-count change requested for a ward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BedDirection {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    pub id: Uuid,
    pub name: String,
    pub floor: String,
    pub total_beds: i32,
    pub occupied_beds: i32,
    pub available_beds: i32,
    pub department: String,
    pub nurse_in_charge: String,
    pub created_at: DateTime<Utc>,
}

impl Ward {
    /// Copy of this ward with one bed taken or released.
    ///
    /// Occupancy never drops below zero; the upper bound is a capacity
    /// policy decision made by the caller.
    pub fn with_bed_adjustment(&self, direction: BedDirection) -> Ward {
        let occupied_beds = match direction {
            BedDirection::Increment => self.occupied_beds.saturating_add(1),
            BedDirection::Decrement => self.occupied_beds.saturating_sub(1).max(0),
        };
        Ward {
            occupied_beds,
            available_beds: self.total_beds.saturating_sub(occupied_beds),
            ..self.clone()
        }
    }

    /// Recompute `available_beds` from the two stored counters
    pub fn recompute_available(mut self) -> Ward {
        self.available_beds = self.total_beds.saturating_sub(self.occupied_beds);
        self
    }

    pub fn is_full(&self) -> bool {
        self.occupied_beds >= self.total_beds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub ward_id: Option<Uuid>,
    pub bed_number: Option<String>,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub diagnosis: String,
    pub status: PatientStatus,
    pub doctor: String,
    pub emergency_contact: String,
    pub blood_group: String,
}

impl Patient {
    /// Ward whose bed this patient currently holds
    pub fn occupied_ward(&self) -> Option<Uuid> {
        if self.status.is_active() {
            self.ward_id
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardTransfer {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub from_ward_id: Option<Uuid>,
    pub from_bed_number: Option<String>,
    pub to_ward_id: Uuid,
    pub to_bed_number: String,
    pub transfer_reason: String,
    pub transferred_by: String,
    pub transferred_by_role: String,
    pub status: TransferStatus,
    pub transfer_date: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approval_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub subtotal: Decimal,
    pub tax_percentage: Decimal,
    pub tax_amount: Decimal,
    pub discount_percentage: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance_amount: Decimal,
    pub status: BillStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Copy of this bill with a payment added to the paid amount.
    ///
    /// `balance = total - paid` and the payment status label are derived
    /// here and nowhere else.
    pub fn with_payment_applied(&self, amount: Decimal) -> Bill {
        let paid_amount = self.paid_amount + amount;
        let balance_amount = self.total_amount - paid_amount;
        Bill {
            paid_amount,
            balance_amount,
            payment_status: PaymentStatus::derive(paid_amount, balance_amount),
            ..self.clone()
        }
    }

    pub fn is_settled(&self) -> bool {
        self.balance_amount <= Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub item_type: BillItemType,
    pub item_name: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub patient_id: Uuid,
    pub payment_number: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub received_by: String,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub name: String,
    pub role: StaffRole,
    pub department: String,
    pub specialization: Option<String>,
    pub phone: String,
    pub email: String,
    pub shift: Shift,
    pub status: StaffStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialization: Option<String>,
    pub department: Option<String>,
}

/// A filled monitoring or OT form; annotation payloads are kept opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub kind: FormKind,
    pub form_type: String,
    pub form_name: String,
    pub template_id: Option<String>,
    pub filled_by: String,
    pub filled_by_role: String,
    pub notes: Option<String>,
    pub form_data: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn ward(total: i32, occupied: i32) -> Ward {
        Ward {
            id: Uuid::new_v4(),
            name: "General Ward A".to_string(),
            floor: "1".to_string(),
            total_beds: total,
            occupied_beds: occupied,
            available_beds: total - occupied,
            department: "General Medicine".to_string(),
            nurse_in_charge: "Sarah Johnson".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn decrement_at_zero_stays_zero() {
        let adjusted = ward(10, 0).with_bed_adjustment(BedDirection::Decrement);
        assert_eq!(adjusted.occupied_beds, 0);
        assert_eq!(adjusted.available_beds, 10);
    }

    #[test]
    fn increment_past_capacity_is_not_capped() {
        let adjusted = ward(2, 2).with_bed_adjustment(BedDirection::Increment);
        assert_eq!(adjusted.occupied_beds, 3);
        assert_eq!(adjusted.available_beds, -1);
    }

    #[test]
    fn payment_status_labels() {
        assert_eq!(PaymentStatus::derive(dec("0"), dec("262.5")), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::derive(dec("100"), dec("162.5")), PaymentStatus::PartiallyPaid);
        assert_eq!(PaymentStatus::derive(dec("262.5"), dec("0")), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::PartiallyPaid.to_string(), "Partially Paid");
    }

    #[test]
    fn labels_round_trip_through_text() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), *method);
        }
        assert!("Teleport".parse::<PaymentMethod>().is_err());
        let json = serde_json::to_string(&StaffStatus::OnLeave).unwrap();
        assert_eq!(json, "\"On Leave\"");
    }

    #[test]
    fn ot_forms_route_to_their_own_table() {
        assert_eq!(FormKind::for_form_type("OT"), FormKind::OperationTheatre);
        assert_eq!(FormKind::for_form_type("Monitoring"), FormKind::Monitoring);
        assert_eq!(FormKind::for_form_type("Activity Chart"), FormKind::Monitoring);
    }

    proptest! {
        #[test]
        fn bed_adjustments_keep_counters_consistent(
            total in 0i32..200,
            start in 0i32..200,
            steps in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let mut current = ward(total, start).recompute_available();
            for increment in steps {
                let direction = if increment { BedDirection::Increment } else { BedDirection::Decrement };
                current = current.with_bed_adjustment(direction);
                prop_assert!(current.occupied_beds >= 0);
                prop_assert_eq!(current.available_beds, current.total_beds - current.occupied_beds);
            }
        }
    }
}
