// Anomaly entity
// A backward clock jump followed by a forward jump that catches up

use serde::{Deserialize, Serialize};

use crate::entities::JournalEntry;

/// Two records adjacent in sequence order whose timestamps straddle a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpBoundary {
    pub from: JournalEntry,
    pub to: JournalEntry,
}

impl JumpBoundary {
    pub fn delta_ticks(&self) -> i64 {
        self.to
            .timestamp
            .ticks()
            .saturating_sub(self.from.timestamp.ticks())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAnomaly {
    pub backward: JumpBoundary,
    pub forward: JumpBoundary,
}
