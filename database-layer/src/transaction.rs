// Applies change sets according to the configured consistency mode
use config_engine::ConsistencyMode;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::changes::{ChangeSet, Mutation, StatePatch};
use crate::error::{DatabaseError, DatabaseResult};
use crate::store::WardStore;

/// Transaction manager applying multi-entity writes
///
/// In [`ConsistencyMode::Transactional`] a change set goes to the store's
/// `apply_all` and either lands completely or not at all. In
/// [`ConsistencyMode::BestEffort`] the writes are issued one by one; when
/// one fails after others landed the result is
/// [`DatabaseError::PartialApplication`] carrying what was written.
#[derive(Clone)]
pub struct TransactionManager {
    store: Arc<dyn WardStore>,
    mode: ConsistencyMode,
}

impl TransactionManager {
    pub fn new(store: Arc<dyn WardStore>, mode: ConsistencyMode) -> Self {
        Self { store, mode }
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<dyn WardStore> {
        &self.store
    }

    pub async fn execute(&self, change_set: ChangeSet) -> DatabaseResult<StatePatch> {
        let ChangeSet { operation, mutations } = change_set;
        if mutations.is_empty() {
            return Ok(StatePatch::new());
        }

        debug!(operation = %operation, writes = mutations.len(), mode = ?self.mode, "Executing change set");

        let patch = match self.mode {
            ConsistencyMode::Transactional => {
                let changes = self.store.apply_all(&mutations).await.map_err(|e| {
                    error!(operation = %operation, error = %e, "Change set rolled back");
                    e
                })?;
                changes.into_iter().collect::<StatePatch>()
            }
            ConsistencyMode::BestEffort => self.apply_sequentially(&operation, &mutations).await?,
        };

        info!(operation = %operation, changes = patch.len(), "Change set applied");
        Ok(patch)
    }

    async fn apply_sequentially(
        &self,
        operation: &str,
        mutations: &[Mutation],
    ) -> DatabaseResult<StatePatch> {
        let total = mutations.len();
        let mut patch = StatePatch::new();

        for (applied, mutation) in mutations.iter().enumerate() {
            match self.store.apply(mutation).await {
                Ok(change) => patch.push(change),
                Err(source) if applied == 0 => return Err(source),
                Err(source) => {
                    error!(
                        operation = %operation,
                        applied,
                        total,
                        failed_write = mutation.describe(),
                        error = %source,
                        "Partial application, persisted state needs reconciliation"
                    );
                    return Err(DatabaseError::PartialApplication {
                        operation: operation.to_string(),
                        applied,
                        total,
                        patch: Box::new(patch),
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::models::{BedDirection, Ward};
    use chrono::Utc;
    use error_common::{Classify, ErrorKind};
    use uuid::Uuid;

    async fn store_with_ward() -> (Arc<InMemoryStore>, Ward) {
        let store = Arc::new(InMemoryStore::new());
        let ward = Ward {
            id: Uuid::new_v4(),
            name: "Surgical Ward".to_string(),
            floor: "2".to_string(),
            total_beds: 18,
            occupied_beds: 12,
            available_beds: 6,
            department: "Surgery".to_string(),
            nurse_in_charge: "Robert Martinez".to_string(),
            created_at: Utc::now(),
        };
        store.apply(&Mutation::InsertWard(ward.clone())).await.unwrap();
        (store, ward)
    }

    fn failing_set(ward_id: Uuid) -> ChangeSet {
        ChangeSet::new("move_patient")
            .with(Mutation::AdjustBeds { ward_id, direction: BedDirection::Decrement })
            .with(Mutation::AdjustBeds { ward_id: Uuid::new_v4(), direction: BedDirection::Increment })
    }

    #[tokio::test]
    async fn transactional_mode_writes_nothing_on_failure() {
        let (store, ward) = store_with_ward().await;
        let manager = TransactionManager::new(store.clone(), ConsistencyMode::Transactional);

        let err = manager.execute(failing_set(ward.id)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.get_ward(ward.id).await.unwrap().occupied_beds, 12);
    }

    #[tokio::test]
    async fn best_effort_mode_reports_partial_application() {
        let (store, ward) = store_with_ward().await;
        let manager = TransactionManager::new(store.clone(), ConsistencyMode::BestEffort);

        let err = manager.execute(failing_set(ward.id)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartialApplication);
        let patch = err.partial_patch().unwrap();
        assert_eq!(patch.ward(ward.id).unwrap().occupied_beds, 11);
        assert_eq!(store.get_ward(ward.id).await.unwrap().occupied_beds, 11);
    }

    #[tokio::test]
    async fn first_write_failure_is_not_partial() {
        let (store, _) = store_with_ward().await;
        let manager = TransactionManager::new(store, ConsistencyMode::BestEffort);
        let set = ChangeSet::new("adjust")
            .with(Mutation::AdjustBeds { ward_id: Uuid::new_v4(), direction: BedDirection::Increment });

        let err = manager.execute(set).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn empty_change_set_is_a_no_op() {
        let (store, _) = store_with_ward().await;
        let manager = TransactionManager::new(store, ConsistencyMode::Transactional);
        assert!(manager.execute(ChangeSet::new("noop")).await.unwrap().is_empty());
    }
}
