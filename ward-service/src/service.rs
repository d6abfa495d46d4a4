use config_engine::Policies;
use database_layer::{TransactionManager, WardStore};
use logger_redacted::PiiRedactor;
use std::sync::Arc;

use crate::beds::BedCountMaintainer;

/// Ward service: wards, patients, transfers, staff and forms
///
/// Each operation reads what it needs from the store, checks its rules,
/// then hands every write it needs to the [`TransactionManager`] as one
/// change set.
#[derive(Clone)]
pub struct WardService {
    pub(crate) transactions: TransactionManager,
    pub(crate) beds: BedCountMaintainer,
    pub(crate) redactor: PiiRedactor,
}

impl WardService {
    pub fn new(transactions: TransactionManager, policies: &Policies) -> Self {
        let beds = BedCountMaintainer::new(transactions.clone(), policies.capacity);
        Self {
            transactions,
            beds,
            redactor: PiiRedactor::default(),
        }
    }

    pub fn with_redactor(mut self, redactor: PiiRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    pub fn beds(&self) -> &BedCountMaintainer {
        &self.beds
    }

    pub(crate) fn store(&self) -> &Arc<dyn WardStore> {
        self.transactions.store()
    }
}
