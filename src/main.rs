//! aero-scraper: one-shot aggregation run.
//! Fetches every source, appends new entries to the research log and
//! persists the seen-set.

use aero_scraper::config::ScraperConfig;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "aero-scraper",
    about = "Aerospace structural-analysis research log scraper",
    version
)]
struct Cli {
    /// Also download verified PDF documents
    #[arg(long, env = "SCRAPER_DOWNLOAD")]
    download: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aero_scraper=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = ScraperConfig::load_default()?;

    let report = aero_scraper::run(&cfg, cli.download).await?;
    tracing::info!(
        fetched = report.fetched,
        seen = report.skipped_seen,
        unreadable = report.skipped_unreadable,
        missing_url = report.skipped_missing_url,
        provider_errors = report.provider_errors,
        downloaded = report.downloaded,
        "run finished"
    );
    println!("Process complete. Added {} new entries.", report.accepted);
    Ok(())
}
