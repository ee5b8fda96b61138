use crate::entities::{CollectionProgress, CollectionSummary, JournalMetadata};

/// Side channel for progress display. Must not influence collection.
pub trait CollectionObserver {
    fn on_metadata(&mut self, _metadata: &JournalMetadata) {}
    fn on_progress(&mut self, progress: &CollectionProgress);
    fn on_finished(&mut self, summary: &CollectionSummary);
    /// Collection stopped on a read failure; `on_finished` will not follow.
    fn on_aborted(&mut self) {}
}
