use std::io::Write;

use anyhow::Result;
use tracing::info;

use timeguard_application::run_audit;
use timeguard_domain::{AuditSettings, CollectionObserver, JournalSource};
use timeguard_interfaces_console::{render_detection, ConsoleProgress};

use crate::context::AuditContext;

pub fn run() -> Result<()> {
    let AuditContext {
        settings,
        mut journal,
    } = AuditContext::new()?;
    info!(
        volume = journal.volume(),
        threshold_ticks = settings.threshold_ticks,
        max_entries = settings.max_entries,
        "starting time change audit"
    );

    let stdout = std::io::stdout();
    run_with(
        &mut journal,
        &settings,
        &mut ConsoleProgress::stderr(),
        &mut stdout.lock(),
    )
}

/// Runs one audit against `source` and writes the result text to `out`.
pub fn run_with(
    source: &mut dyn JournalSource,
    settings: &AuditSettings,
    observer: &mut dyn CollectionObserver,
    out: &mut dyn Write,
) -> Result<()> {
    let outcome = run_audit(source, settings, observer)?;
    out.write_all(render_detection(&outcome.detection).as_bytes())?;
    out.flush()?;
    Ok(())
}
