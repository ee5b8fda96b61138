// Journal entry entity
// The two fields of a change record the audit cares about

use serde::{Deserialize, Serialize};

use crate::value_objects::{FileTime, Usn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub usn: Usn,
    pub timestamp: FileTime,
}

impl JournalEntry {
    pub fn new(usn: u64, ticks: i64) -> Self {
        Self {
            usn: Usn(usn),
            timestamp: FileTime(ticks),
        }
    }
}
