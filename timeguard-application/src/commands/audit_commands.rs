use tracing::{debug, error, info};

use timeguard_domain::{
    AnomalyDetector, AuditSettings, CollectionObserver, CollectionSummary, Detection,
    JournalCollector, JournalMetadata, JournalSource,
};

use crate::AppError;

#[derive(Debug, Clone, Copy)]
pub struct AuditOutcome {
    pub metadata: JournalMetadata,
    pub summary: CollectionSummary,
    pub detection: Detection,
}

/// Queries the journal bounds, drains the journal and scans it once for a
/// clock rollback. Detection never runs on a partially read journal.
pub fn run_audit(
    source: &mut dyn JournalSource,
    settings: &AuditSettings,
    observer: &mut dyn CollectionObserver,
) -> Result<AuditOutcome, AppError> {
    let metadata = source.query_metadata().map_err(|err| {
        error!(code = ?err.os_code(), "failed to query journal: {}", err);
        AppError::Query(err)
    })?;
    info!(
        journal_id = metadata.journal_id,
        first_usn = %metadata.first_usn,
        next_usn = %metadata.next_usn,
        "reading change journal"
    );
    debug!(
        lowest_valid_usn = %metadata.lowest_valid_usn,
        max_usn = %metadata.max_usn,
        "journal bounds"
    );
    observer.on_metadata(&metadata);

    let collection = JournalCollector::new(settings.max_entries)
        .collect(source, &metadata, observer)
        .map_err(|err| {
            error!(code = ?err.os_code(), "failed to read journal: {}", err);
            AppError::Collection(err)
        })?;
    info!(
        entries = collection.summary.entries,
        pages = collection.summary.pages,
        stop = %collection.summary.stop,
        "journal collection finished"
    );

    let detector = AnomalyDetector::new(settings.threshold_ticks);
    let detection = detector.detect(collection.entries);
    match &detection {
        Detection::InsufficientData { entries } => {
            info!(entries, "not enough entries to analyze")
        }
        Detection::Clean { entries } => info!(entries, "no time anomaly detected"),
        Detection::Anomaly(anomaly) => info!(
            backward_from = %anomaly.backward.from.usn,
            forward_to = %anomaly.forward.to.usn,
            "time anomaly detected"
        ),
    }

    Ok(AuditOutcome {
        metadata,
        summary: collection.summary,
        detection,
    })
}
