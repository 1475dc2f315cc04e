// src/ingest/providers/ntrs.rs
//! NASA Technical Reports Server citation search.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;

use super::{fetch_body, id_string, non_blank};
use crate::ingest::absolutize;
use crate::ingest::types::{CandidateRecord, FetchWindow, SourceKind, SourceProvider};
use crate::ingest::window::parse_published;

pub const SEARCH_URL: &str = "https://ntrs.nasa.gov/api/citations/search";
pub const HOST: &str = "https://ntrs.nasa.gov";
pub const DEFAULT_QUERY: &str = "structural analysis fitting factors composite fatigue";
pub const RELEVANCE: &str = "structural analysis, fitting factors, composite fatigue";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<Citation>>,
}

#[derive(Debug, Deserialize)]
struct Citation {
    id: Option<serde_json::Value>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    publications: Option<Vec<Publication>>,
    #[serde(rename = "distributionDate")]
    distribution_date: Option<String>,
    #[serde(rename = "submittedDate")]
    submitted_date: Option<String>,
    downloads: Option<Vec<Download>>,
}

#[derive(Debug, Deserialize)]
struct Publication {
    #[serde(rename = "publicationDate")]
    publication_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Download {
    mimetype: Option<String>,
    links: Option<DownloadLinks>,
}

#[derive(Debug, Deserialize)]
struct DownloadLinks {
    pdf: Option<String>,
    original: Option<String>,
}

impl Citation {
    fn published_raw(&self) -> Option<&str> {
        self.publications
            .iter()
            .flatten()
            .find_map(|p| p.publication_date.as_deref())
            .or(self.distribution_date.as_deref())
            .or(self.submitted_date.as_deref())
    }

    /// First PDF download (`pdf`, then `original`), else the citation landing page.
    fn document_url(&self) -> Option<String> {
        let pdf_link = self
            .downloads
            .iter()
            .flatten()
            .find(|d| d.mimetype.as_deref() == Some("application/pdf"))
            .and_then(|d| d.links.as_ref())
            .and_then(|l| non_blank(l.pdf.as_deref()).or(non_blank(l.original.as_deref())));

        match pdf_link {
            Some(link) => Some(absolutize(link, HOST)),
            None => self
                .id
                .as_ref()
                .and_then(id_string)
                .map(|id| format!("{HOST}/citations/{id}")),
        }
    }
}

pub struct NtrsProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        client: reqwest::Client,
        query: String,
        page_size: u32,
    },
}

impl NtrsProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn new(client: reqwest::Client, query: impl Into<String>, page_size: u32) -> Self {
        Self {
            mode: Mode::Http {
                client,
                query: query.into(),
                page_size,
            },
        }
    }

    pub fn parse_items_from_str(s: &str, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        let t0 = std::time::Instant::now();
        let resp: SearchResponse = serde_json::from_str(s).context("parsing ntrs json")?;

        let mut out = Vec::new();
        for c in resp.results.unwrap_or_default() {
            let published = c.published_raw();
            if !window.admits(published) {
                continue;
            }
            out.push(
                CandidateRecord::new(
                    SourceKind::Ntrs,
                    c.title.as_deref(),
                    c.document_url(),
                    c.abstract_text.as_deref().unwrap_or_default(),
                    RELEVANCE,
                )
                .with_published(published.and_then(parse_published)),
            );
        }

        histogram!("scrape_parse_ms", "provider" => "NASA").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for NtrsProvider {
    async fn fetch_latest(&self, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s, window),
            Mode::Http {
                client,
                query,
                page_size,
            } => {
                let req = client.get(SEARCH_URL).query(&[
                    ("q", query.clone()),
                    ("published.gte", window.since_date()),
                    ("page.size", page_size.to_string()),
                ]);
                let body = fetch_body(req, "NASA").await?;
                Self::parse_items_from_str(&body, window)
            }
        }
    }

    fn name(&self) -> &'static str {
        "NASA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> FetchWindow {
        FetchWindow::last_days(Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(), 7)
    }

    #[test]
    fn prefers_original_when_pdf_link_missing() {
        let body = r#"{"results":[{"id":7,"title":"T","downloads":[
            {"mimetype":"text/plain","links":{"pdf":"/nope.pdf"}},
            {"mimetype":"application/pdf","links":{"original":"/api/citations/7/downloads/orig.pdf"}}
        ]}]}"#;
        let out = NtrsProvider::parse_items_from_str(body, &window()).unwrap();
        assert_eq!(
            out[0].url.as_deref(),
            Some("https://ntrs.nasa.gov/api/citations/7/downloads/orig.pdf")
        );
    }

    #[test]
    fn empty_links_fall_through_to_original_then_landing_page() {
        let body = r#"{"results":[
            {"id":8,"title":"A","downloads":[{"mimetype":"application/pdf",
                "links":{"pdf":"","original":"/api/citations/8/downloads/a.pdf"}}]},
            {"id":9,"title":"B","downloads":[{"mimetype":"application/pdf","links":{"pdf":""}}]},
            {"id":10,"title":"C","downloads":[{"mimetype":"application/pdf",
                "links":{"pdf":" ","original":""}}]}
        ]}"#;
        let out = NtrsProvider::parse_items_from_str(body, &window()).unwrap();
        let urls: Vec<_> = out.iter().map(|c| c.url.as_deref().unwrap()).collect();
        assert_eq!(
            urls,
            vec![
                "https://ntrs.nasa.gov/api/citations/8/downloads/a.pdf",
                "https://ntrs.nasa.gov/citations/9",
                "https://ntrs.nasa.gov/citations/10",
            ]
        );
    }

    #[test]
    fn falls_back_to_landing_page_and_placeholder_title() {
        let body = r#"{"results":[{"id":"19990001","downloads":null,"abstract":null}]}"#;
        let out = NtrsProvider::parse_items_from_str(body, &window()).unwrap();
        assert_eq!(out[0].url.as_deref(), Some("https://ntrs.nasa.gov/citations/19990001"));
        assert_eq!(out[0].title, "No Title");
        assert_eq!(out[0].abstract_text, "");
    }

    #[test]
    fn publication_date_wins_over_submitted_date() {
        let body = r#"{"results":[{"id":1,"title":"Old",
            "publications":[{"publicationDate":"2020-01-01T00:00:00.0000000+00:00"}],
            "submittedDate":"2024-06-07T00:00:00.0000000+00:00"}]}"#;
        let out = NtrsProvider::parse_items_from_str(body, &window()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_results_is_empty_not_error() {
        let out = NtrsProvider::parse_items_from_str("{}", &window()).unwrap();
        assert!(out.is_empty());
        assert!(NtrsProvider::parse_items_from_str("<html>", &window()).is_err());
    }
}
