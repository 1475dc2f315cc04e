// tests/metrics_pipeline.rs
mod common;

use aero_scraper::ingest::types::{SourceKind, SourceProvider};
use aero_scraper::seen::SeenSet;
use aero_scraper::{run_once, Stages};
use common::*;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::test]
async fn metrics_exposed_after_run() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new().install_recorder().expect("recorder");

    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(StaticProvider {
            name: "Static",
            items: vec![
                rec(SourceKind::Ntrs, "Kept", Some("https://m.test/citations/1")),
                rec(SourceKind::Ntrs, "Dup", Some("https://m.test/citations/1")),
                rec(SourceKind::Ntrs, "Scan", Some("https://m.test/scan.pdf")),
            ],
        }),
        Box::new(FailingProvider),
    ];
    let verifier = ScriptedVerifier::default();
    let log = MemoryLog::default();
    let stages = Stages {
        verifier: &verifier,
        log: &log,
        downloader: None,
        today: today(),
    };
    let report = run_once(&providers, &mut SeenSet::new(), &stages, &window()).await;
    assert_eq!(report.accepted, 1);

    let out = handle.render();
    assert!(out.contains("scrape_candidates_total"));
    assert!(out.contains("scrape_accepted_total"));
    assert!(out.contains(r#"reason="seen""#));
    assert!(out.contains(r#"reason="unreadable""#));
    assert!(out.contains("scrape_provider_errors_total"));
    assert!(out.contains("scrape_last_run_ts"));
}
