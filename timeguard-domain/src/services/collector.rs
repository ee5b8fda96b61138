use tracing::{debug, warn};

use crate::entities::{
    CollectionProgress, CollectionSummary, JournalEntry, JournalMetadata, StopReason,
};
use crate::error::JournalError;
use crate::ports::{CollectionObserver, JournalSource, PageRead, ReadRequest};
use crate::services::record::JournalPage;

pub const PAGE_BUFFER_BYTES: usize = 64 * 1024;

#[derive(Debug)]
pub struct Collection {
    /// Entries in arrival order.
    pub entries: Vec<JournalEntry>,
    pub summary: CollectionSummary,
}

/// Drains the change journal page by page into a bounded entry list.
#[derive(Debug)]
pub struct JournalCollector {
    max_entries: usize,
    buffer: Vec<u8>,
}

impl JournalCollector {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            buffer: vec![0u8; PAGE_BUFFER_BYTES],
        }
    }

    /// Reads from `metadata.first_usn` up to `metadata.next_usn`. A read
    /// failure aborts the whole collection and drops what was gathered.
    pub fn collect(
        &mut self,
        source: &mut dyn JournalSource,
        metadata: &JournalMetadata,
        observer: &mut dyn CollectionObserver,
    ) -> Result<Collection, JournalError> {
        let mut entries: Vec<JournalEntry> = Vec::new();
        let mut cursor = metadata.first_usn;
        let mut pages = 0u64;
        let mut skipped_records = 0u64;

        let stop = loop {
            if entries.len() >= self.max_entries {
                break StopReason::CapReached;
            }
            if cursor >= metadata.next_usn {
                break StopReason::EndSequenceReached;
            }

            let request = ReadRequest::all_reasons(metadata.journal_id, cursor);
            let read = match source.read_page(&request, &mut self.buffer) {
                Ok(PageRead::EndOfJournal) => break StopReason::EndOfJournal,
                Ok(PageRead::Bytes(read)) => read.min(self.buffer.len()),
                Err(err) => {
                    observer.on_aborted();
                    return Err(err);
                }
            };
            let Some(page) = JournalPage::parse(&self.buffer[..read]) else {
                debug!(read, cursor = %cursor, "read shorter than page header");
                break StopReason::ShortRead;
            };
            pages += 1;

            for record in page.records() {
                match record {
                    Ok(Some(entry)) => {
                        if entries.len() >= self.max_entries {
                            break;
                        }
                        entries.push(entry);
                    }
                    Ok(None) => skipped_records += 1,
                    Err(err) => {
                        warn!(cursor = %cursor, "discarding rest of journal page: {}", err);
                        break;
                    }
                }
            }

            observer.on_progress(&CollectionProgress::new(cursor, metadata, entries.len()));

            let next = page.next_usn();
            if next <= cursor {
                warn!(cursor = %cursor, next = %next, "journal page did not advance the cursor");
                break StopReason::Stalled;
            }
            cursor = next;
        };

        let summary = CollectionSummary {
            entries: entries.len(),
            pages,
            skipped_records,
            stop,
        };
        debug!(?summary, "journal collection finished");
        observer.on_finished(&summary);
        Ok(Collection { entries, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, record_v2, RecordingObserver, ScriptedSource};
    use crate::value_objects::Usn;

    fn run(source: &mut ScriptedSource, cap: usize) -> Result<Collection, JournalError> {
        let metadata = source.metadata;
        JournalCollector::new(cap).collect(source, &metadata, &mut RecordingObserver::default())
    }

    #[test]
    fn follows_next_usn_across_pages() {
        let mut source = ScriptedSource::new(100, 400)
            .page(page(200, &[record_v2(100, 10, 0), record_v2(150, 20, 0)]))
            .page(page(400, &[record_v2(200, 30, 0)]));
        let collection = run(&mut source, 1_000).expect("collect");

        let starts: Vec<Usn> = source.requests.iter().map(|r| r.start_usn).collect();
        assert_eq!(starts, vec![Usn(100), Usn(200)]);
        assert!(source
            .requests
            .iter()
            .all(|r| r.journal_id == 42 && r.reason_mask == u32::MAX && !r.return_only_on_close));
        assert_eq!(collection.entries.len(), 3);
        assert_eq!(collection.summary.pages, 2);
        assert_eq!(collection.summary.stop, StopReason::EndSequenceReached);
    }

    #[test]
    fn cap_bounds_entries_even_mid_page() {
        let records: Vec<Vec<u8>> = (0..10).map(|i| record_v2(100 + i, 10, 0)).collect();
        let mut source = ScriptedSource::new(100, 10_000)
            .page(page(200, &records))
            .page(page(300, &records));
        let collection = run(&mut source, 4).expect("collect");
        assert_eq!(collection.entries.len(), 4);
        assert_eq!(collection.summary.stop, StopReason::CapReached);
        assert_eq!(source.requests.len(), 1);
    }

    #[test]
    fn end_of_journal_on_first_read_yields_nothing() {
        let mut source = ScriptedSource::new(100, 400).end_of_journal();
        let collection = run(&mut source, 1_000).expect("collect");
        assert!(collection.entries.is_empty());
        assert_eq!(collection.summary.stop, StopReason::EndOfJournal);
        assert_eq!(collection.summary.pages, 0);
    }

    #[test]
    fn short_read_is_a_benign_stop() {
        let mut source = ScriptedSource::new(100, 400)
            .page(page(200, &[record_v2(100, 10, 0)]))
            .page(vec![1, 2, 3]);
        let collection = run(&mut source, 1_000).expect("collect");
        assert_eq!(collection.entries.len(), 1);
        assert_eq!(collection.summary.stop, StopReason::ShortRead);
    }

    #[test]
    fn read_failure_aborts_collection() {
        let mut source = ScriptedSource::new(100, 400)
            .page(page(200, &[record_v2(100, 10, 0)]))
            .failure(200);
        let metadata = source.metadata;
        let mut observer = RecordingObserver::default();
        let err = JournalCollector::new(1_000)
            .collect(&mut source, &metadata, &mut observer)
            .expect_err("read failure");
        assert!(matches!(err, JournalError::Read { start_usn: Usn(200), .. }));
        assert_eq!(err.os_code(), Some(23));
        assert!(observer.aborted);
        assert!(observer.finished.is_none());
        assert_eq!(observer.progress.len(), 1);
    }

    #[test]
    fn malformed_record_keeps_page_prefix_and_paging_continues() {
        // A zero-length record cuts the first page short.
        let mut first = page(200, &[record_v2(100, 10, 0)]);
        first.extend_from_slice(&[0u8; 64]);
        let mut source = ScriptedSource::new(100, 300)
            .page(first)
            .page(page(300, &[record_v2(200, 20, 0)]));
        let collection = run(&mut source, 1_000).expect("collect");
        let usns: Vec<u64> = collection.entries.iter().map(|e| e.usn.0).collect();
        assert_eq!(usns, vec![100, 200]);
        assert_eq!(collection.summary.stop, StopReason::EndSequenceReached);
        assert_eq!(collection.summary.pages, 2);
        assert_eq!(source.requests.len(), 2);
    }

    #[test]
    fn starting_at_or_past_the_end_reads_nothing() {
        let mut source = ScriptedSource::new(400, 400);
        let collection = run(&mut source, 1_000).expect("collect");
        assert!(source.requests.is_empty());
        assert_eq!(collection.summary.stop, StopReason::EndSequenceReached);
    }

    #[test]
    fn non_advancing_page_stops_instead_of_spinning() {
        let mut source = ScriptedSource::new(100, 400)
            .page(page(100, &[record_v2(100, 10, 0)]))
            .page(page(100, &[record_v2(100, 10, 0)]));
        let collection = run(&mut source, 1_000).expect("collect");
        assert_eq!(collection.summary.stop, StopReason::Stalled);
        assert_eq!(source.requests.len(), 1);
    }

    #[test]
    fn duplicate_and_out_of_order_usns_are_kept_in_arrival_order() {
        let mut source = ScriptedSource::new(100, 400).page(page(
            400,
            &[record_v2(300, 1, 0), record_v2(120, 2, 0), record_v2(120, 3, 0)],
        ));
        let collection = run(&mut source, 1_000).expect("collect");
        let usns: Vec<u64> = collection.entries.iter().map(|e| e.usn.0).collect();
        assert_eq!(usns, vec![300, 120, 120]);
    }

    #[test]
    fn progress_is_reported_per_page_and_clamped() {
        let mut source = ScriptedSource::new(0, 100)
            .page(page(50, &[record_v2(0, 1, 0)]))
            .page(page(500, &[record_v2(50, 2, 0)]));
        let metadata = source.metadata;
        let mut observer = RecordingObserver::default();
        JournalCollector::new(1_000)
            .collect(&mut source, &metadata, &mut observer)
            .expect("collect");
        let percents: Vec<f64> = observer.progress.iter().map(|p| p.percent()).collect();
        assert_eq!(percents, vec![0.0, 50.0]);
        let summary = observer.finished.expect("finished");
        assert_eq!(summary.entries, 2);
    }
}
