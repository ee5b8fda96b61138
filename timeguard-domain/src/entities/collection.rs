// Collection entities
// Progress and outcome of draining the journal

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::JournalMetadata;
use crate::value_objects::Usn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The collected sequence reached the entry cap.
    CapReached,
    /// The cursor reached the journal's next-free sequence number.
    EndSequenceReached,
    /// The journal reported that no more data is available.
    EndOfJournal,
    /// A read returned fewer bytes than a page header.
    ShortRead,
    /// A page did not move the cursor forward.
    Stalled,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::CapReached => "entry cap reached",
            StopReason::EndSequenceReached => "end of journal range reached",
            StopReason::EndOfJournal => "end of journal",
            StopReason::ShortRead => "short read",
            StopReason::Stalled => "journal cursor stalled",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub entries: usize,
    pub pages: u64,
    pub skipped_records: u64,
    pub stop: StopReason,
}

/// Snapshot reported after each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionProgress {
    pub cursor: Usn,
    pub start: Usn,
    pub end: Usn,
    pub entries: usize,
}

impl CollectionProgress {
    pub fn new(cursor: Usn, metadata: &JournalMetadata, entries: usize) -> Self {
        Self {
            cursor,
            start: metadata.first_usn,
            end: metadata.next_usn,
            entries,
        }
    }

    pub fn total(&self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Journal span already consumed, clamped to the total.
    pub fn processed(&self) -> u64 {
        self.cursor.0.saturating_sub(self.start.0).min(self.total())
    }

    pub fn percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        self.processed() as f64 / total as f64 * 100.0
    }
}
