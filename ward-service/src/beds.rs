use config_engine::CapacityPolicy;
use database_layer::{Applied, BedDirection, ChangeSet, Mutation, TransactionManager, Ward};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{WardError, WardResult};

/// Ward bed-count maintainer
///
/// Every operation that moves a patient into or out of a ward plans its
/// bed change here. The arithmetic itself lives in
/// [`Ward::with_bed_adjustment`] and runs against the stored row when the
/// `AdjustBeds` write is applied.
#[derive(Clone)]
pub struct BedCountMaintainer {
    transactions: TransactionManager,
    capacity: CapacityPolicy,
}

impl BedCountMaintainer {
    pub fn new(transactions: TransactionManager, capacity: CapacityPolicy) -> Self {
        Self { transactions, capacity }
    }

    pub fn capacity(&self) -> CapacityPolicy {
        self.capacity
    }

    /// Plan taking one bed in `ward`, enforcing the capacity policy
    pub fn occupy(&self, ward: &Ward) -> WardResult<Mutation> {
        if ward.is_full() && !self.capacity.allows_overflow() {
            warn!(
                ward_id = %ward.id,
                occupied = ward.occupied_beds,
                total = ward.total_beds,
                "Rejected admission to full ward"
            );
            return Err(WardError::CapacityExceeded(format!(
                "{} has no available beds ({} of {} occupied)",
                ward.name, ward.occupied_beds, ward.total_beds
            )));
        }
        debug!(ward_id = %ward.id, occupied = ward.occupied_beds, "Planned bed increment");
        Ok(Mutation::AdjustBeds {
            ward_id: ward.id,
            direction: BedDirection::Increment,
        })
    }

    /// Plan releasing one bed; occupancy is clamped at zero when applied
    pub fn release(&self, ward_id: Uuid) -> Mutation {
        debug!(ward_id = %ward_id, "Planned bed decrement");
        Mutation::AdjustBeds {
            ward_id,
            direction: BedDirection::Decrement,
        }
    }

    /// Adjust one ward's counters on their own
    pub async fn adjust_bed_count(&self, ward_id: Uuid, direction: BedDirection) -> WardResult<Applied<Ward>> {
        let ward = self.transactions.store().get_ward(ward_id).await?;
        let mutation = match direction {
            BedDirection::Increment => self.occupy(&ward)?,
            BedDirection::Decrement => self.release(ward_id),
        };

        let patch = self
            .transactions
            .execute(ChangeSet::new("adjust_bed_count").with(mutation))
            .await?;
        let ward = patch
            .ward(ward_id)
            .cloned()
            .unwrap_or_else(|| ward.with_bed_adjustment(direction));

        info!(
            ward_id = %ward_id,
            occupied = ward.occupied_beds,
            available = ward.available_beds,
            "Ward bed count adjusted"
        );
        Ok(Applied::new(ward, patch))
    }
}
