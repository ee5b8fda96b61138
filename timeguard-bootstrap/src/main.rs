use anyhow::Result;
use clap::Parser;

/// Thresholds come from timeguard.toml (or TIMEGUARD_CONFIG) and the
/// TIMEGUARD_THRESHOLD_SECONDS / TIMEGUARD_MAX_ENTRIES environment variables.
#[derive(Parser, Debug)]
#[command(name = "timeguard", version)]
#[command(about = "Audit the NTFS change journal for signs of system clock rollback")]
struct Args {}

fn main() -> Result<()> {
    let _args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    timeguard_bootstrap::run()
}
