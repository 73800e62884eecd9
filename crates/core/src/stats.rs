use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate counts over the whole event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    pub total: u64,
    pub unresolved: u64,
    /// Distinct `ip_address` values.
    pub unique_ips: u64,
    pub by_type: BTreeMap<String, u64>,
}

impl EventStats {
    pub fn count_for(&self, event_type: &str) -> u64 {
        self.by_type.get(event_type).copied().unwrap_or(0)
    }
}
