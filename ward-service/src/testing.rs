// Fixtures shared by the unit tests
use chrono::Utc;
use config_engine::{ConsistencyMode, Policies};
use database_layer::{InMemoryStore, Mutation, PatientStatus, TransactionManager, Ward, WardStore};
use std::sync::Arc;
use uuid::Uuid;

use crate::requests::PatientDetails;
use crate::service::WardService;

pub(crate) fn service(policies: Policies) -> (WardService, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let transactions = TransactionManager::new(store.clone(), ConsistencyMode::Transactional);
    (WardService::new(transactions, &policies), store)
}

pub(crate) async fn seed_ward(store: &InMemoryStore, name: &str, total: i32, occupied: i32) -> Ward {
    let ward = Ward {
        id: Uuid::new_v4(),
        name: name.to_string(),
        floor: "1".to_string(),
        total_beds: total,
        occupied_beds: occupied,
        available_beds: total - occupied,
        department: "General Medicine".to_string(),
        nurse_in_charge: "Sarah Johnson".to_string(),
        created_at: Utc::now(),
    };
    store.apply(&Mutation::InsertWard(ward.clone())).await.unwrap();
    ward
}

pub(crate) fn details(ward_id: Option<Uuid>, bed: &str) -> PatientDetails {
    PatientDetails {
        name: "John Doe".to_string(),
        age: 45,
        gender: "Male".to_string(),
        ward_id,
        bed_number: ward_id.map(|_| bed.to_string()),
        diagnosis: "Pneumonia".to_string(),
        status: PatientStatus::Admitted,
        doctor: "Dr. Smith".to_string(),
        emergency_contact: "+1-555-0101".to_string(),
        blood_group: "O+".to_string(),
    }
}

pub(crate) async fn occupied(store: &InMemoryStore, ward_id: Uuid) -> i32 {
    store.get_ward(ward_id).await.unwrap().occupied_beds
}
