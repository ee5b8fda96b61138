// Change journal page decoding
//
// A page is an 8-byte little-endian "next USN" followed by packed variable
// length records. Every record starts with its own length and version, so the
// buffer is walked using the declared length rather than a fixed stride.

use thiserror::Error;

use crate::entities::JournalEntry;
use crate::value_objects::Usn;

pub const PAGE_HEADER_LEN: usize = 8;

/// RecordLength (u32) + MajorVersion (u16) + MinorVersion (u16).
const RECORD_PREFIX_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordLayout {
    pub(crate) usn_offset: usize,
    pub(crate) timestamp_offset: usize,
    /// Fixed part of the record, up to the start of the file name.
    pub(crate) min_len: usize,
}

/// 64-bit file reference numbers.
pub(crate) const LAYOUT_V2: RecordLayout = RecordLayout {
    usn_offset: 24,
    timestamp_offset: 32,
    min_len: 60,
};

/// 128-bit file reference numbers.
pub(crate) const LAYOUT_V3: RecordLayout = RecordLayout {
    usn_offset: 40,
    timestamp_offset: 48,
    min_len: 76,
};

fn layout_for(major_version: u16) -> Option<RecordLayout> {
    match major_version {
        2 => Some(LAYOUT_V2),
        3 => Some(LAYOUT_V3),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record at offset {offset} declares zero length")]
    ZeroLength { offset: usize },
    #[error("record at offset {offset} declares {declared} bytes but only {remaining} remain")]
    Truncated {
        offset: usize,
        declared: usize,
        remaining: usize,
    },
    #[error(
        "v{version} record at offset {offset} declares {declared} bytes, \
         below the {minimum}-byte header"
    )]
    TooShort {
        offset: usize,
        version: u16,
        declared: usize,
        minimum: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct JournalPage<'a> {
    next_usn: Usn,
    records: &'a [u8],
}

impl<'a> JournalPage<'a> {
    /// Returns `None` when the buffer is too small to hold the page header.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        let next_usn = read_u64_le(bytes, 0)?;
        Some(Self {
            next_usn: Usn(next_usn),
            records: &bytes[PAGE_HEADER_LEN..],
        })
    }

    pub fn next_usn(&self) -> Usn {
        self.next_usn
    }

    pub fn records(&self) -> RecordIter<'a> {
        RecordIter {
            bytes: self.records,
            position: 0,
            failed: false,
        }
    }
}

/// Yields `Ok(Some(entry))` for decodable records, `Ok(None)` for records of
/// an unknown version, and a single `Err` on the first malformed record,
/// after which iteration ends.
#[derive(Debug, Clone)]
pub struct RecordIter<'a> {
    bytes: &'a [u8],
    position: usize,
    failed: bool,
}

impl RecordIter<'_> {
    fn fail(&mut self, err: RecordError) -> Option<Result<Option<JournalEntry>, RecordError>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Result<Option<JournalEntry>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.bytes.len() {
            return None;
        }
        let bytes = self.bytes;
        let offset = self.position;
        let remaining = bytes.len() - offset;
        let record = &bytes[offset..];

        let (Some(declared), Some(major_version)) =
            (read_u32_le(record, 0), read_u16_le(record, 4))
        else {
            return self.fail(RecordError::Truncated {
                offset,
                declared: RECORD_PREFIX_LEN,
                remaining,
            });
        };
        let declared = declared as usize;
        if declared == 0 {
            return self.fail(RecordError::ZeroLength { offset });
        }
        if declared > remaining {
            return self.fail(RecordError::Truncated {
                offset,
                declared,
                remaining,
            });
        }

        let record = &record[..declared];
        let layout = layout_for(major_version);
        let minimum = layout.map_or(RECORD_PREFIX_LEN, |layout| layout.min_len);
        if declared < minimum {
            return self.fail(RecordError::TooShort {
                offset,
                version: major_version,
                declared,
                minimum,
            });
        }
        let Some(layout) = layout else {
            self.position += declared;
            return Some(Ok(None));
        };
        let (Some(usn), Some(ticks)) = (
            read_u64_le(record, layout.usn_offset),
            read_i64_le(record, layout.timestamp_offset),
        ) else {
            return self.fail(RecordError::TooShort {
                offset,
                version: major_version,
                declared,
                minimum: layout.min_len,
            });
        };

        self.position += declared;
        Some(Ok(Some(JournalEntry::new(usn, ticks))))
    }
}

fn read_u16_le(bytes: &[u8], start: usize) -> Option<u16> {
    let raw: [u8; 2] = bytes.get(start..start.checked_add(2)?)?.try_into().ok()?;
    Some(u16::from_le_bytes(raw))
}

fn read_u32_le(bytes: &[u8], start: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(start..start.checked_add(4)?)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

fn read_u64_le(bytes: &[u8], start: usize) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(start..start.checked_add(8)?)?.try_into().ok()?;
    Some(u64::from_le_bytes(raw))
}

fn read_i64_le(bytes: &[u8], start: usize) -> Option<i64> {
    let raw: [u8; 8] = bytes.get(start..start.checked_add(8)?)?.try_into().ok()?;
    Some(i64::from_le_bytes(raw))
}
