// Test doubles and synthetic journal pages
// Shared with other crates' tests through the `test-util` feature

use std::collections::VecDeque;
use std::io;

use crate::entities::{CollectionProgress, CollectionSummary, JournalMetadata};
use crate::error::JournalError;
use crate::ports::{CollectionObserver, JournalSource, PageRead, ReadRequest};
use crate::services::record::{RecordLayout, LAYOUT_V2, LAYOUT_V3};
use crate::value_objects::Usn;

pub fn record_v2(usn: u64, ticks: i64, name_len: usize) -> Vec<u8> {
    record(2, &LAYOUT_V2, usn, ticks, name_len)
}

pub fn record_v3(usn: u64, ticks: i64, name_len: usize) -> Vec<u8> {
    record(3, &LAYOUT_V3, usn, ticks, name_len)
}

/// A record of a version the decoder does not understand.
pub fn record_unknown(major_version: u16, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    bytes[0..4].copy_from_slice(&(len as u32).to_le_bytes());
    bytes[4..6].copy_from_slice(&major_version.to_le_bytes());
    bytes
}

fn record(version: u16, layout: &RecordLayout, usn: u64, ticks: i64, name_len: usize) -> Vec<u8> {
    // Records are padded to 8-byte alignment.
    let len = (layout.min_len + name_len + 7) & !7;
    let mut bytes = vec![0u8; len];
    bytes[0..4].copy_from_slice(&(len as u32).to_le_bytes());
    bytes[4..6].copy_from_slice(&version.to_le_bytes());
    bytes[layout.usn_offset..layout.usn_offset + 8].copy_from_slice(&usn.to_le_bytes());
    bytes[layout.timestamp_offset..layout.timestamp_offset + 8]
        .copy_from_slice(&ticks.to_le_bytes());
    bytes
}

pub fn page(next_usn: u64, records: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = next_usn.to_le_bytes().to_vec();
    for record in records {
        bytes.extend_from_slice(record);
    }
    bytes
}

/// Replays a fixed list of page responses.
pub struct ScriptedSource {
    pub metadata: JournalMetadata,
    pub pages: VecDeque<Result<Option<Vec<u8>>, JournalError>>,
    pub requests: Vec<ReadRequest>,
}

impl ScriptedSource {
    pub fn new(first: u64, next: u64) -> Self {
        Self {
            metadata: JournalMetadata {
                journal_id: 42,
                first_usn: Usn(first),
                next_usn: Usn(next),
                lowest_valid_usn: Usn(0),
                max_usn: Usn(u64::MAX),
            },
            pages: VecDeque::new(),
            requests: Vec::new(),
        }
    }

    pub fn page(mut self, bytes: Vec<u8>) -> Self {
        self.pages.push_back(Ok(Some(bytes)));
        self
    }

    pub fn end_of_journal(mut self) -> Self {
        self.pages.push_back(Ok(None));
        self
    }

    pub fn failure(mut self, start: u64) -> Self {
        self.pages.push_back(Err(JournalError::Read {
            start_usn: Usn(start),
            source: io::Error::from_raw_os_error(23),
        }));
        self
    }
}

impl JournalSource for ScriptedSource {
    fn query_metadata(&mut self) -> Result<JournalMetadata, JournalError> {
        Ok(self.metadata)
    }

    fn read_page(
        &mut self,
        request: &ReadRequest,
        buffer: &mut [u8],
    ) -> Result<PageRead, JournalError> {
        self.requests.push(*request);
        match self.pages.pop_front() {
            Some(Ok(Some(bytes))) => {
                let len = bytes.len().min(buffer.len());
                buffer[..len].copy_from_slice(&bytes[..len]);
                Ok(PageRead::Bytes(len))
            }
            Some(Ok(None)) | None => Ok(PageRead::EndOfJournal),
            Some(Err(err)) => Err(err),
        }
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub progress: Vec<CollectionProgress>,
    pub finished: Option<CollectionSummary>,
    pub aborted: bool,
}

impl CollectionObserver for RecordingObserver {
    fn on_progress(&mut self, progress: &CollectionProgress) {
        self.progress.push(*progress);
    }

    fn on_finished(&mut self, summary: &CollectionSummary) {
        self.finished = Some(*summary);
    }

    fn on_aborted(&mut self) {
        self.aborted = true;
    }
}
