use crate::entities::JournalMetadata;
use crate::error::JournalError;
use crate::value_objects::Usn;

/// Every change reason bit set.
pub const REASON_MASK_ALL: u32 = 0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    pub journal_id: u64,
    pub start_usn: Usn,
    pub reason_mask: u32,
    pub return_only_on_close: bool,
}

impl ReadRequest {
    pub fn all_reasons(journal_id: u64, start_usn: Usn) -> Self {
        Self {
            journal_id,
            start_usn,
            reason_mask: REASON_MASK_ALL,
            return_only_on_close: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRead {
    /// Number of bytes written into the caller's buffer.
    Bytes(usize),
    /// The journal has no more records past the requested position.
    EndOfJournal,
}

pub trait JournalSource {
    fn query_metadata(&mut self) -> Result<JournalMetadata, JournalError>;
    fn read_page(
        &mut self,
        request: &ReadRequest,
        buffer: &mut [u8],
    ) -> Result<PageRead, JournalError>;
}
