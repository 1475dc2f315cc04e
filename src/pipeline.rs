// src/pipeline.rs
//! Merge → dedup → verify → log. Strictly sequential, no retries.

use chrono::NaiveDate;
use metrics::{counter, gauge};

use crate::download::{DownloadOutcome, Downloader};
use crate::ingest::types::{CandidateRecord, FetchWindow, SourceProvider};
use crate::ingest::{collect_candidates, ensure_metrics_described};
use crate::research_log::{format_entry, LogSink};
use crate::seen::SeenSet;
use crate::verify::{is_pdf_url, PdfVerifier};

/// Collaborators for one run.
pub struct Stages<'a> {
    pub verifier: &'a dyn PdfVerifier,
    pub log: &'a dyn LogSink,
    pub downloader: Option<&'a dyn Downloader>,
    /// Date stamped on log entries.
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub accepted: usize,
    pub skipped_missing_url: usize,
    pub skipped_seen: usize,
    pub skipped_unreadable: usize,
    pub downloaded: usize,
    pub provider_errors: usize,
    pub log_errors: usize,
}

enum Verdict {
    Accept(String),
    MissingUrl,
    Seen,
    Unreadable,
}

async fn judge(rec: &CandidateRecord, seen: &SeenSet, verifier: &dyn PdfVerifier) -> Verdict {
    let Some(url) = rec.url.as_deref() else {
        return Verdict::MissingUrl;
    };
    if seen.contains(url) {
        return Verdict::Seen;
    }
    if is_pdf_url(url) && !verifier.verify(url).await.readable {
        return Verdict::Unreadable;
    }
    Verdict::Accept(url.to_string())
}

/// Process every provider's candidates in adapter order against `seen`.
/// The first candidate for a url wins; later duplicates hit the seen check.
pub async fn run_once(
    providers: &[Box<dyn SourceProvider>],
    seen: &mut SeenSet,
    stages: &Stages<'_>,
    window: &FetchWindow,
) -> RunReport {
    ensure_metrics_described();

    let (candidates, provider_errors) = collect_candidates(providers, window).await;
    let mut report = RunReport {
        fetched: candidates.len(),
        provider_errors,
        ..RunReport::default()
    };

    for rec in &candidates {
        let url = match judge(rec, seen, stages.verifier).await {
            Verdict::Accept(url) => url,
            Verdict::MissingUrl => {
                report.skipped_missing_url += 1;
                counter!("scrape_skipped_total", "reason" => "missing_url").increment(1);
                continue;
            }
            Verdict::Seen => {
                report.skipped_seen += 1;
                counter!("scrape_skipped_total", "reason" => "seen").increment(1);
                continue;
            }
            Verdict::Unreadable => {
                tracing::warn!(url = rec.url.as_deref(), source = %rec.source, "skipping unreadable pdf");
                report.skipped_unreadable += 1;
                counter!("scrape_skipped_total", "reason" => "unreadable").increment(1);
                continue;
            }
        };

        // Only mark seen once the entry is actually on disk.
        if let Err(e) = stages.log.append(&format_entry(rec, &url, stages.today)) {
            tracing::warn!(error = ?e, url = %url, "research log append failed");
            report.log_errors += 1;
            continue;
        }
        seen.insert(url.clone());
        report.accepted += 1;
        counter!("scrape_accepted_total", "source" => rec.source.label()).increment(1);
        tracing::info!(source = %rec.source, title = %rec.title, url = %url, "new entry");

        if let Some(dl) = stages.downloader.filter(|_| is_pdf_url(&url)) {
            match dl.download(&rec.title, &url).await {
                Ok(DownloadOutcome::Saved(path)) => {
                    report.downloaded += 1;
                    counter!("scrape_downloads_total").increment(1);
                    tracing::info!(path = %path.display(), "downloaded pdf");
                }
                Ok(DownloadOutcome::AlreadyPresent(path)) => {
                    tracing::debug!(path = %path.display(), "pdf already downloaded");
                }
                Err(e) => tracing::warn!(error = ?e, url = %url, "pdf download failed"),
            }
        }
    }

    gauge!("scrape_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);
    report
}
