// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod download;
pub mod ingest;
pub mod pipeline;
pub mod research_log;
pub mod seen;
pub mod verify;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tracing::info;

use crate::config::ScraperConfig;
use crate::download::{Downloader, FsDownloader};
use crate::ingest::providers::{
    arxiv::ArxivProvider, build_client, core_works, core_works::CoreProvider,
    federal_register::FederalRegisterProvider, ntrs::NtrsProvider,
};
use crate::ingest::types::{FetchWindow, SourceProvider};
use crate::research_log::MarkdownLog;
use crate::seen::SeenStore;
use crate::verify::HttpPdfVerifier;

pub use crate::pipeline::{run_once, RunReport, Stages};

/// Adapters in merge order. This order decides attribution when two
/// sources return the same url.
pub fn build_providers(
    cfg: &ScraperConfig,
    client: reqwest::Client,
    core_api_key: Option<String>,
) -> Vec<Box<dyn SourceProvider>> {
    vec![
        Box::new(NtrsProvider::new(client.clone(), &cfg.ntrs_query, cfg.ntrs_page_size)),
        Box::new(FederalRegisterProvider::new(client.clone(), &cfg.federal_register_term)),
        Box::new(ArxivProvider::new(client.clone(), &cfg.arxiv_query, cfg.arxiv_max_results)),
        Box::new(CoreProvider::new(client, core_api_key, &cfg.core_query, cfg.core_limit)),
    ]
}

/// Load the seen-set, run the pipeline once, then persist the full set.
pub async fn run_persisted(
    providers: &[Box<dyn SourceProvider>],
    store: &SeenStore,
    stages: &Stages<'_>,
    window: &FetchWindow,
) -> Result<RunReport> {
    let mut seen = store.load();
    info!(seen = seen.len(), path = %store.path().display(), "seen-set loaded");

    let report = run_once(providers, &mut seen, stages, window).await;

    store
        .save(&seen)
        .with_context(|| format!("saving seen-set to {}", store.path().display()))?;
    Ok(report)
}

/// Full production run against the live upstream APIs.
pub async fn run(cfg: &ScraperConfig, download: bool) -> Result<RunReport> {
    let client = build_client(&cfg.user_agent)?;
    let core_key = core_works::api_key_from_env();
    if core_key.is_none() {
        info!("{} not found; CORE search disabled", core_works::ENV_API_KEY);
    }
    let providers = build_providers(cfg, client.clone(), core_key);

    let verifier = HttpPdfVerifier::new(client.clone());
    let log = MarkdownLog::new(&cfg.log_path);
    let downloader = download.then(|| FsDownloader::new(&cfg.download_dir, client));
    let stages = Stages {
        verifier: &verifier,
        log: &log,
        downloader: downloader.as_ref().map(|d| d as &dyn Downloader),
        today: Local::now().date_naive(),
    };
    let window = FetchWindow::last_days(Utc::now(), cfg.window_days);

    run_persisted(&providers, &SeenStore::new(&cfg.seen_path), &stages, &window).await
}
