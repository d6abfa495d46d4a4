use billing_service::display_amount;
use database_layer::{BillStatus, PatientStatus, StaffStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::state::StateSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardOccupancy {
    pub ward_id: Uuid,
    pub name: String,
    pub occupied_beds: i32,
    pub available_beds: i32,
    pub occupancy_rate: f64,
}

/// Headline figures for the ward dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_wards: usize,
    pub total_beds: i64,
    pub occupied_beds: i64,
    pub available_beds: i64,
    /// Percentage with one decimal place
    pub occupancy_rate: f64,
    pub active_patients: usize,
    pub critical_patients: usize,
    pub patients_by_status: BTreeMap<String, usize>,
    pub active_staff: usize,
    pub total_staff: usize,
    pub ward_occupancy: Vec<WardOccupancy>,
    pub outstanding_balance: Decimal,
}

/// Occupied share of `total` beds as a percentage rounded to one decimal
#[allow(clippy::cast_precision_loss)]
pub fn occupancy_rate(occupied: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let rate = occupied as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

impl DashboardStats {
    pub fn compute(state: &StateSnapshot) -> Self {
        let total_beds: i64 = state.wards.iter().map(|ward| i64::from(ward.total_beds)).sum();
        let occupied_beds: i64 = state.wards.iter().map(|ward| i64::from(ward.occupied_beds)).sum();

        let mut patients_by_status: BTreeMap<String, usize> = PatientStatus::ALL
            .iter()
            .filter(|status| status.is_active())
            .map(|status| (status.to_string(), 0))
            .collect();
        for patient in state.patients.iter().filter(|patient| patient.status.is_active()) {
            *patients_by_status.entry(patient.status.to_string()).or_insert(0) += 1;
        }

        let ward_occupancy = state
            .wards
            .iter()
            .map(|ward| WardOccupancy {
                ward_id: ward.id,
                name: ward.name.clone(),
                occupied_beds: ward.occupied_beds,
                available_beds: ward.available_beds,
                occupancy_rate: occupancy_rate(i64::from(ward.occupied_beds), i64::from(ward.total_beds)),
            })
            .collect();

        let outstanding: Decimal = state
            .bills
            .iter()
            .filter(|bill| bill.status != BillStatus::Cancelled)
            .map(|bill| bill.balance_amount.max(Decimal::ZERO))
            .sum();

        Self {
            total_wards: state.wards.len(),
            total_beds,
            occupied_beds,
            available_beds: total_beds - occupied_beds,
            occupancy_rate: occupancy_rate(occupied_beds, total_beds),
            active_patients: state.patients.iter().filter(|p| p.status.is_active()).count(),
            critical_patients: state
                .patients
                .iter()
                .filter(|p| p.status == PatientStatus::Critical)
                .count(),
            patients_by_status,
            active_staff: state.staff.iter().filter(|s| s.status == StaffStatus::Active).count(),
            total_staff: state.staff.len(),
            ward_occupancy,
            outstanding_balance: display_amount(outstanding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use database_layer::{Patient, Ward};

    fn ward(total: i32, occupied: i32) -> Ward {
        Ward {
            id: Uuid::new_v4(),
            name: format!("Ward {total}"),
            floor: "1".to_string(),
            total_beds: total,
            occupied_beds: occupied,
            available_beds: total - occupied,
            department: "General Medicine".to_string(),
            nurse_in_charge: "Sarah Johnson".to_string(),
            created_at: Utc::now(),
        }
    }

    fn patient(status: PatientStatus) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: "Robert Brown".to_string(),
            age: 67,
            gender: "Male".to_string(),
            ward_id: None,
            bed_number: None,
            admission_date: Utc::now(),
            discharge_date: None,
            diagnosis: "Cardiac monitoring".to_string(),
            status,
            doctor: "Dr. Williams".to_string(),
            emergency_contact: "+1-555-0103".to_string(),
            blood_group: "AB-".to_string(),
        }
    }

    #[test]
    fn occupancy_rate_has_one_decimal() {
        assert_eq!(occupancy_rate(23, 30), 76.7);
        assert_eq!(occupancy_rate(0, 0), 0.0);
        assert_eq!(occupancy_rate(10, 10), 100.0);
    }

    #[test]
    fn stats_count_only_active_patients() {
        let state = StateSnapshot {
            wards: vec![ward(20, 15), ward(10, 8)],
            patients: vec![
                patient(PatientStatus::Admitted),
                patient(PatientStatus::Critical),
                patient(PatientStatus::Critical),
                patient(PatientStatus::Discharged),
            ],
            ..StateSnapshot::default()
        };
        let stats = DashboardStats::compute(&state);

        assert_eq!(stats.total_beds, 30);
        assert_eq!(stats.occupied_beds, 23);
        assert_eq!(stats.available_beds, 7);
        assert_eq!(stats.occupancy_rate, 76.7);
        assert_eq!(stats.active_patients, 3);
        assert_eq!(stats.critical_patients, 2);
        assert_eq!(stats.patients_by_status["Critical"], 2);
        assert_eq!(stats.patients_by_status["Stable"], 0);
        assert!(!stats.patients_by_status.contains_key("Discharged"));
        assert_eq!(stats.ward_occupancy.len(), 2);
        assert_eq!(stats.outstanding_balance, Decimal::ZERO);
    }
}
