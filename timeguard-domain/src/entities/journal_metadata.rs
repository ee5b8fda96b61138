// Journal metadata entity
// Snapshot of the journal bounds, taken once before paging begins

use serde::{Deserialize, Serialize};

use crate::value_objects::Usn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalMetadata {
    pub journal_id: u64,
    /// First record still present in the journal.
    pub first_usn: Usn,
    /// Sequence number the next written record will receive.
    pub next_usn: Usn,
    pub lowest_valid_usn: Usn,
    pub max_usn: Usn,
}
