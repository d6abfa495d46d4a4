//! Named policy choices for behavior the ward workflow leaves open.

use serde::{Deserialize, Serialize};

/// What happens when a patient is placed in a ward with no free bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Occupied beds may exceed total beds (overflow admission)
    AllowOverflow,
    /// Placement into a full ward is rejected
    #[default]
    Reject,
}

impl CapacityPolicy {
    pub fn allows_overflow(self) -> bool {
        matches!(self, CapacityPolicy::AllowOverflow)
    }
}

/// How a payment larger than the outstanding balance is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentPolicy {
    /// The payment is refused
    #[default]
    Reject,
    /// The payment is reduced to the outstanding balance
    Clamp,
    /// The payment is accepted and the balance goes negative
    Allow,
}

/// How multi-entity writes reach the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// All writes of one operation commit together or not at all
    #[default]
    Transactional,
    /// Writes are issued one after another; a failure part way through
    /// is reported as a partial application and nothing is rolled back
    BestEffort,
}

/// Policy bundle handed to the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Policies {
    pub capacity: CapacityPolicy,
    pub overpayment: OverpaymentPolicy,
    pub consistency: ConsistencyMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_strict_choices() {
        let policies = Policies::default();
        assert_eq!(policies.capacity, CapacityPolicy::Reject);
        assert_eq!(policies.overpayment, OverpaymentPolicy::Reject);
        assert_eq!(policies.consistency, ConsistencyMode::Transactional);
        assert!(!policies.capacity.allows_overflow());
    }
}
