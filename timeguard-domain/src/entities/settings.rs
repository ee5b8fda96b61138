// Audit settings entity
// The two policy constants a run is parameterised by

use serde::{Deserialize, Serialize};

use crate::value_objects::TICKS_PER_SECOND;

pub const DEFAULT_THRESHOLD_SECONDS: u64 = 5 * 60;
pub const DEFAULT_MAX_ENTRIES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Minimum jump magnitude, in 100ns ticks, that counts as a discontinuity.
    pub threshold_ticks: i64,
    pub max_entries: usize,
}

impl AuditSettings {
    pub fn new(threshold_seconds: u64, max_entries: usize) -> Self {
        let seconds = i64::try_from(threshold_seconds).unwrap_or(i64::MAX);
        Self {
            threshold_ticks: seconds.saturating_mul(TICKS_PER_SECOND),
            max_entries,
        }
    }
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_SECONDS, DEFAULT_MAX_ENTRIES)
    }
}
