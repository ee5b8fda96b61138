// Operator-facing result text

use std::fmt::Write;

use timeguard_domain::{Detection, JournalEntry, TimeAnomaly};

pub fn render_detection(detection: &Detection) -> String {
    match detection {
        Detection::InsufficientData { .. } => {
            "There are not enough entries to analyze\n".to_string()
        }
        Detection::Clean { entries } => {
            format!("No time anomaly detected ({} entries analyzed).\n", entries)
        }
        Detection::Anomaly(anomaly) => render_anomaly(anomaly),
    }
}

pub fn render_anomaly(anomaly: &TimeAnomaly) -> String {
    let mut out = String::from("Time anomaly detected:\n");
    out.push_str("Backward Jump:\n");
    push_line(&mut out, " From: ", &anomaly.backward.from);
    push_line(&mut out, " To:   ", &anomaly.backward.to);
    out.push_str("Forward Jump:\n");
    push_line(&mut out, " From: ", &anomaly.forward.from);
    push_line(&mut out, " To:   ", &anomaly.forward.to);
    out
}

fn push_line(out: &mut String, label: &str, entry: &JournalEntry) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}{} (USN: {})", label, entry.timestamp, entry.usn);
}
