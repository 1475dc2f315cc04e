// src/ingest/providers/core_works.rs
//! CORE v3 works search. Needs an API key; without one the adapter is disabled.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Datelike;
use metrics::histogram;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{id_string, non_blank};
use crate::ingest::absolutize;
use crate::ingest::types::{CandidateRecord, FetchWindow, SourceKind, SourceProvider};
use crate::ingest::window::parse_published;

pub const SEARCH_URL: &str = "https://api.core.ac.uk/v3/search/works";
pub const HOST: &str = "https://core.ac.uk";
pub const ENV_API_KEY: &str = "CORE_API_KEY";
pub const DEFAULT_QUERY: &str =
    r#""aircraft structural analysis" AND (fatigue OR "fitting factor" OR composite)"#;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<Work>>,
}

#[derive(Debug, Deserialize)]
struct Work {
    id: Option<serde_json::Value>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(rename = "downloadUrl")]
    download_url: Option<String>,
    #[serde(rename = "sourceFulltextUrls")]
    source_fulltext_urls: Option<Vec<String>>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
}

impl Work {
    /// CORE-hosted download first, then the first source full text, then the landing page.
    fn document_url(&self) -> Option<String> {
        non_blank(self.download_url.as_deref())
            .or_else(|| {
                self.source_fulltext_urls
                    .iter()
                    .flatten()
                    .map(String::as_str)
                    .find(|u| !u.trim().is_empty())
            })
            .map(|u| absolutize(u, HOST))
            .or_else(|| {
                self.id
                    .as_ref()
                    .and_then(id_string)
                    .map(|id| format!("{HOST}/works/{id}"))
            })
    }
}

/// Read the credential, treating a blank value as absent.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(ENV_API_KEY)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

pub struct CoreProvider {
    mode: Mode,
    query: String,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        search_url: String,
        api_key: Option<String>,
        limit: u32,
    },
}

impl CoreProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            query: DEFAULT_QUERY.to_string(),
        }
    }

    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        query: impl Into<String>,
        limit: u32,
    ) -> Self {
        Self {
            mode: Mode::Http {
                client,
                search_url: SEARCH_URL.to_string(),
                api_key,
                limit,
            },
            query: query.into(),
        }
    }

    /// Point the HTTP mode at another search endpoint (mirrors, local stubs).
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        if let Mode::Http { search_url, .. } = &mut self.mode {
            *search_url = url.into();
        }
        self
    }

    pub fn is_enabled(&self) -> bool {
        match &self.mode {
            Mode::Fixture(_) => true,
            Mode::Http { api_key, .. } => api_key.is_some(),
        }
    }

    fn parse_items_from_str(&self, s: &str, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        let t0 = std::time::Instant::now();
        let resp: SearchResponse = serde_json::from_str(s).context("parsing core json")?;

        let mut out = Vec::new();
        for w in resp.results.unwrap_or_default() {
            if !window.admits(w.published_date.as_deref()) {
                continue;
            }
            out.push(
                CandidateRecord::new(
                    SourceKind::Core,
                    w.title.as_deref(),
                    w.document_url(),
                    w.abstract_text.as_deref().unwrap_or_default(),
                    &self.query,
                )
                .with_published(w.published_date.as_deref().and_then(parse_published)),
            );
        }

        histogram!("scrape_parse_ms", "provider" => "CORE").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    /// CORE filters by year only; the exact cut-off is applied locally.
    fn search_query(&self, window: &FetchWindow) -> String {
        format!("({}) AND yearPublished>={}", self.query, window.since.year())
    }
}

#[async_trait]
impl SourceProvider for CoreProvider {
    async fn fetch_latest(&self, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, window),
            Mode::Http {
                client,
                search_url,
                api_key,
                limit,
            } => {
                let Some(key) = api_key else {
                    tracing::info!(provider = "CORE", "{ENV_API_KEY} not set; skipping");
                    return Ok(Vec::new());
                };
                let resp = client
                    .get(search_url.as_str())
                    .bearer_auth(key)
                    .query(&[
                        ("q", self.search_query(window)),
                        ("limit", limit.to_string()),
                    ])
                    .send()
                    .await
                    .context("CORE http get()")?;

                let status = resp.status();
                if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
                    bail!("CORE rejected the API key (HTTP {status})");
                }
                if !status.is_success() {
                    bail!("CORE returned HTTP {status}");
                }
                let body = resp.text().await.context("CORE http .text()")?;
                self.parse_items_from_str(&body, window)
            }
        }
    }

    fn name(&self) -> &'static str {
        "CORE"
    }
}
