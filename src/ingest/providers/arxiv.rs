// src/ingest/providers/arxiv.rs
//! arXiv export API (Atom feed).

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use super::{fetch_body, non_blank};
use crate::ingest::absolutize;
use crate::ingest::types::{CandidateRecord, FetchWindow, SourceKind, SourceProvider};
use crate::ingest::window::parse_published;

pub const QUERY_URL: &str = "https://export.arxiv.org/api/query";
pub const HOST: &str = "https://arxiv.org";
pub const DEFAULT_QUERY: &str =
    r#"abs:"structural analysis" AND (abs:aircraft OR abs:aerospace OR abs:fatigue)"#;

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@title")]
    title: Option<String>,
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl Entry {
    /// PDF link (forced to a `.pdf` suffix), then the abstract page, then the entry id.
    fn document_url(&self) -> Option<String> {
        let pdf = self.links.iter().find(|l| {
            l.title.as_deref() == Some("pdf") || l.kind.as_deref() == Some("application/pdf")
        });
        if let Some(href) = pdf.and_then(|l| non_blank(l.href.as_deref())) {
            let mut url = absolutize(href, HOST);
            if !url.to_ascii_lowercase().ends_with(".pdf") {
                url.push_str(".pdf");
            }
            return Some(url);
        }

        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate") || l.kind.as_deref() == Some("text/html"))
            .and_then(|l| non_blank(l.href.as_deref()))
            .or(non_blank(self.id.as_deref()))
            .map(|u| absolutize(u, HOST))
    }
}

pub struct ArxivProvider {
    mode: Mode,
    query: String,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        max_results: u32,
    },
}

impl ArxivProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            query: DEFAULT_QUERY.to_string(),
        }
    }

    pub fn new(client: reqwest::Client, query: impl Into<String>, max_results: u32) -> Self {
        Self {
            mode: Mode::Http {
                client,
                max_results,
            },
            query: query.into(),
        }
    }

    fn parse_items_from_str(&self, s: &str, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        let t0 = std::time::Instant::now();
        let feed: Feed = from_str(s).context("parsing arxiv atom xml")?;

        let mut out = Vec::with_capacity(feed.entries.len());
        for e in feed.entries {
            if !window.admits(e.published.as_deref()) {
                continue;
            }
            out.push(
                CandidateRecord::new(
                    SourceKind::Arxiv,
                    e.title.as_deref(),
                    e.document_url(),
                    e.summary.as_deref().unwrap_or_default(),
                    &self.query,
                )
                .with_published(e.published.as_deref().and_then(parse_published)),
            );
        }

        histogram!("scrape_parse_ms", "provider" => "arXiv").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    /// Topic query narrowed upstream to the submission window.
    fn search_query(&self, window: &FetchWindow) -> String {
        format!(
            "({}) AND submittedDate:[{} TO {}]",
            self.query,
            window.since.format("%Y%m%d%H%M"),
            window.until.format("%Y%m%d%H%M")
        )
    }
}

#[async_trait]
impl SourceProvider for ArxivProvider {
    async fn fetch_latest(&self, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, window),
            Mode::Http {
                client,
                max_results,
            } => {
                let req = client.get(QUERY_URL).query(&[
                    ("search_query", self.search_query(window)),
                    ("sortBy", "submittedDate".to_string()),
                    ("sortOrder", "descending".to_string()),
                    ("max_results", max_results.to_string()),
                ]);
                let body = fetch_body(req, "arXiv").await?;
                self.parse_items_from_str(&body, window)
            }
        }
    }

    fn name(&self) -> &'static str {
        "arXiv"
    }
}
