// src/ingest/mod.rs
pub mod providers;
pub mod types;
pub mod window;

use crate::ingest::types::{CandidateRecord, FetchWindow, SourceProvider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "scrape_candidates_total",
            "Candidate records produced by source adapters."
        );
        describe_counter!(
            "scrape_accepted_total",
            "Candidates appended to the research log."
        );
        describe_counter!(
            "scrape_skipped_total",
            "Candidates dropped, labelled by reason."
        );
        describe_counter!(
            "scrape_provider_errors_total",
            "Adapter fetch/parse errors collapsed to an empty result."
        );
        describe_counter!("scrape_downloads_total", "PDF documents saved to disk.");
        describe_histogram!("scrape_parse_ms", "Adapter parse time in milliseconds.");
        describe_gauge!("scrape_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace.
/// Sentence punctuation is kept since log summaries split on it.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML/JATS tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 5000 chars
    if out.chars().count() > 5000 {
        out = out.chars().take(5000).collect();
    }

    out
}

/// Rewrite a relative link against the adapter's host (`https://host`).
pub fn absolutize(url: &str, host: &str) -> String {
    let u = url.trim();
    if u.starts_with("http://") || u.starts_with("https://") {
        return u.to_string();
    }
    if let Some(rest) = u.strip_prefix("//") {
        return format!("https://{rest}");
    }
    let host = host.trim_end_matches('/');
    if u.starts_with('/') {
        format!("{host}{u}")
    } else {
        format!("{host}/{u}")
    }
}

/// Query every provider in order and concatenate their output.
/// A failing provider contributes nothing; the error is logged and counted.
/// Returns (candidates, provider_error_count).
pub async fn collect_candidates(
    providers: &[Box<dyn SourceProvider>],
    window: &FetchWindow,
) -> (Vec<CandidateRecord>, usize) {
    ensure_metrics_described();

    let mut raw = Vec::new();
    let mut errors = 0usize;
    for p in providers {
        match p.fetch_latest(window).await {
            Ok(mut v) => {
                tracing::info!(provider = p.name(), found = v.len(), "provider fetched");
                counter!("scrape_candidates_total", "provider" => p.name()).increment(v.len() as u64);
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("scrape_provider_errors_total", "provider" => p.name()).increment(1);
                errors += 1;
            }
        }
    }
    (raw, errors)
}
