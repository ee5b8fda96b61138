// Clock rollback detection
//
// Entries are put in journal order, then adjacent timestamps are compared.
// A drop larger than the threshold arms the detector; the first later rise
// larger than the threshold completes the pattern and ends the scan.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{JournalEntry, JumpBoundary, TimeAnomaly};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Detection {
    /// Fewer than two entries, nothing to compare.
    InsufficientData { entries: usize },
    Clean { entries: usize },
    Anomaly(TimeAnomaly),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Seeking,
    BackwardFound(JumpBoundary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyDetector {
    threshold_ticks: i64,
}

impl AnomalyDetector {
    pub fn new(threshold_ticks: i64) -> Self {
        Self {
            threshold_ticks: threshold_ticks.max(0),
        }
    }

    /// Consumes the collected entries in arrival order.
    pub fn detect(&self, mut entries: Vec<JournalEntry>) -> Detection {
        if entries.len() < 2 {
            return Detection::InsufficientData {
                entries: entries.len(),
            };
        }
        entries.sort_by_key(|entry| entry.usn);
        debug!(entries = entries.len(), "entries sorted by USN");
        self.scan(&entries)
    }

    /// Single pass over entries already in USN order.
    pub fn scan(&self, sorted: &[JournalEntry]) -> Detection {
        let mut state = ScanState::Seeking;
        for pair in sorted.windows(2) {
            let boundary = JumpBoundary {
                from: pair[0],
                to: pair[1],
            };
            let delta = boundary.delta_ticks();
            state = match state {
                ScanState::Seeking if delta < -self.threshold_ticks => {
                    debug!(
                        from = %boundary.from.usn,
                        to = %boundary.to.usn,
                        delta,
                        "backward jump"
                    );
                    ScanState::BackwardFound(boundary)
                }
                ScanState::Seeking => ScanState::Seeking,
                ScanState::BackwardFound(backward) if delta > self.threshold_ticks => {
                    debug!(
                        from = %boundary.from.usn,
                        to = %boundary.to.usn,
                        delta,
                        "forward jump"
                    );
                    return Detection::Anomaly(TimeAnomaly {
                        backward,
                        forward: boundary,
                    });
                }
                armed @ ScanState::BackwardFound(_) => armed,
            };
        }
        Detection::Clean {
            entries: sorted.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{FileTime, Usn, TICKS_PER_SECOND};

    fn entries(timestamps: &[i64]) -> Vec<JournalEntry> {
        timestamps
            .iter()
            .enumerate()
            .map(|(i, ticks)| JournalEntry::new(i as u64 + 1, *ticks))
            .collect()
    }

    fn boundary_ticks(boundary: &JumpBoundary) -> (i64, i64) {
        (boundary.from.timestamp.ticks(), boundary.to.timestamp.ticks())
    }

    fn boundary_usns(boundary: &JumpBoundary) -> (u64, u64) {
        (boundary.from.usn.0, boundary.to.usn.0)
    }

    #[test]
    fn rollback_then_restore_is_reported() {
        let detection = AnomalyDetector::new(100).detect(entries(&[1000, 500, 1000]));
        let Detection::Anomaly(anomaly) = detection else {
            panic!("expected anomaly, got {detection:?}");
        };
        assert_eq!(boundary_ticks(&anomaly.backward), (1000, 500));
        assert_eq!(boundary_usns(&anomaly.backward), (1, 2));
        assert_eq!(boundary_ticks(&anomaly.forward), (500, 1000));
        assert_eq!(boundary_usns(&anomaly.forward), (2, 3));
    }

    #[test]
    fn steadily_increasing_clock_is_clean() {
        let timestamps: Vec<i64> = (0..1_000).collect();
        let detection = AnomalyDetector::new(100).detect(entries(&timestamps));
        assert_eq!(detection, Detection::Clean { entries: 1_000 });
    }

    #[test]
    fn fewer_than_two_entries_is_insufficient() {
        let detector = AnomalyDetector::new(100);
        assert_eq!(
            detector.detect(Vec::new()),
            Detection::InsufficientData { entries: 0 }
        );
        assert_eq!(
            detector.detect(entries(&[5])),
            Detection::InsufficientData { entries: 1 }
        );
    }

    #[test]
    fn entries_are_ordered_by_usn_before_scanning() {
        // Arrival order hides the rollback; USN order exposes it.
        let arrival = vec![
            JournalEntry::new(3, 1000),
            JournalEntry::new(1, 1000),
            JournalEntry::new(2, 500),
        ];
        let Detection::Anomaly(anomaly) = AnomalyDetector::new(100).detect(arrival) else {
            panic!("expected anomaly");
        };
        assert_eq!(boundary_usns(&anomaly.backward), (1, 2));
        assert_eq!(boundary_usns(&anomaly.forward), (2, 3));
    }

    #[test]
    fn duplicate_usns_do_not_break_sorting() {
        // In arrival order the steps are +500, 0, 0; only the sorted sequence jumps.
        let arrival = vec![
            JournalEntry::new(2, 500),
            JournalEntry::new(1, 1000),
            JournalEntry::new(3, 1000),
            JournalEntry::new(1, 1000),
        ];
        let Detection::Anomaly(anomaly) = AnomalyDetector::new(100).detect(arrival) else {
            panic!("expected anomaly");
        };
        assert_eq!(boundary_usns(&anomaly.backward), (1, 2));
        assert_eq!(boundary_usns(&anomaly.forward), (2, 3));
        assert_eq!(anomaly.backward.from, JournalEntry::new(1, 1000));
        assert_eq!(anomaly.backward.to, JournalEntry::new(2, 500));
    }

    #[test]
    fn jumps_must_strictly_exceed_the_threshold() {
        let detector = AnomalyDetector::new(100);
        assert_eq!(
            detector.scan(&entries(&[1000, 900, 1000])),
            Detection::Clean { entries: 3 }
        );
        assert!(matches!(
            detector.scan(&entries(&[1000, 899, 1000])),
            Detection::Anomaly(_)
        ));
        assert_eq!(
            detector.scan(&entries(&[1000, 899, 999])),
            Detection::Clean { entries: 3 }
        );
    }

    #[test]
    fn forward_jump_without_prior_rollback_is_ignored() {
        let detection = AnomalyDetector::new(100).scan(&entries(&[0, 1000, 2000, 1500]));
        assert_eq!(detection, Detection::Clean { entries: 4 });
    }

    #[test]
    fn first_backward_jump_wins() {
        let detection =
            AnomalyDetector::new(100).scan(&entries(&[5000, 4000, 3000, 3050, 6000, 100, 9000]));
        let Detection::Anomaly(anomaly) = detection else {
            panic!("expected anomaly");
        };
        assert_eq!(boundary_ticks(&anomaly.backward), (5000, 4000));
        assert_eq!(boundary_ticks(&anomaly.forward), (3050, 6000));
    }

    #[test]
    fn first_forward_jump_after_rollback_wins() {
        let detection =
            AnomalyDetector::new(100).scan(&entries(&[1000, 0, 50, 500, 2000, 5000]));
        let Detection::Anomaly(anomaly) = detection else {
            panic!("expected anomaly");
        };
        assert_eq!(boundary_ticks(&anomaly.forward), (50, 500));
    }

    #[test]
    fn partial_restoration_still_matches() {
        let detection = AnomalyDetector::new(100).scan(&entries(&[10_000, 0, 200]));
        let Detection::Anomaly(anomaly) = detection else {
            panic!("expected anomaly");
        };
        assert_eq!(anomaly.forward.delta_ticks(), 200);
        assert_eq!(anomaly.backward.delta_ticks(), -10_000);
    }

    #[test]
    fn pair_that_arms_is_not_also_the_forward_jump() {
        // The only large rise is the one right after arming; there is none.
        let detection = AnomalyDetector::new(100).scan(&entries(&[1000, 0, 1, 2]));
        assert_eq!(detection, Detection::Clean { entries: 4 });
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let detection = AnomalyDetector::new(100).scan(&entries(&[i64::MAX, i64::MIN, i64::MAX]));
        assert!(matches!(detection, Detection::Anomaly(_)));
    }

    #[test]
    fn realistic_five_minute_rollback() {
        let minute = 60 * TICKS_PER_SECOND;
        let base = 133_500_000_000_000_000_i64;
        let timestamps = [
            base,
            base + minute,
            base - 60 * minute,
            base - 59 * minute,
            base + 2 * minute,
        ];
        let detector = AnomalyDetector::new(5 * minute);
        let Detection::Anomaly(anomaly) = detector.detect(entries(&timestamps)) else {
            panic!("expected anomaly");
        };
        assert_eq!(anomaly.backward.from.usn, Usn(2));
        assert_eq!(anomaly.backward.to.timestamp, FileTime(base - 60 * minute));
        assert_eq!(anomaly.forward.to.usn, Usn(5));
    }
}
