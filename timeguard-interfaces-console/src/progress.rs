use std::io::{self, Write};

use tracing::debug;

use timeguard_domain::{
    CollectionObserver, CollectionProgress, CollectionSummary, JournalMetadata,
};

const BAR_WIDTH: usize = 70;

/// Draws a single-line progress bar, redrawn in place after every page.
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl ConsoleProgress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            debug!("progress output failed: {}", err);
        }
    }
}

impl<W: Write> CollectionObserver for ConsoleProgress<W> {
    fn on_metadata(&mut self, metadata: &JournalMetadata) {
        let text = format!(
            "Reading USN Journal...\nJournal ID: {}\nFirst USN: {}\nNext USN: {}\n",
            metadata.journal_id, metadata.first_usn, metadata.next_usn
        );
        self.emit(&text);
    }

    fn on_progress(&mut self, progress: &CollectionProgress) {
        let line = format!("\r{}", render_bar(progress, BAR_WIDTH));
        self.emit(&line);
    }

    fn on_finished(&mut self, summary: &CollectionSummary) {
        let mut text = format!(
            "\nDump completed. Entries processed: {} ({})\n",
            summary.entries, summary.stop
        );
        if summary.skipped_records > 0 {
            text.push_str(&format!(
                "Records skipped (unsupported version): {}\n",
                summary.skipped_records
            ));
        }
        self.emit(&text);
    }

    fn on_aborted(&mut self) {
        self.emit("\n");
    }
}

pub fn render_bar(progress: &CollectionProgress, width: usize) -> String {
    let percent = progress.percent();
    let filled = ((width as f64) * percent / 100.0) as usize;
    let bar: String = (0..width)
        .map(|i| match i.cmp(&filled) {
            std::cmp::Ordering::Less => '=',
            std::cmp::Ordering::Equal => '>',
            std::cmp::Ordering::Greater => ' ',
        })
        .collect();
    format!(
        "Processing: [{}] {:.2}% ({}/{} records)",
        bar,
        percent,
        progress.processed(),
        progress.total()
    )
}
