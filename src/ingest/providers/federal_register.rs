// src/ingest/providers/federal_register.rs
//! Federal Register documents API, filtered to FAA airworthiness directives.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;

use super::{fetch_body, non_blank};
use crate::ingest::absolutize;
use crate::ingest::types::{CandidateRecord, FetchWindow, SourceKind, SourceProvider};
use crate::ingest::window::parse_published;

pub const DOCUMENTS_URL: &str = "https://www.federalregister.gov/api/v1/documents.json";
pub const HOST: &str = "https://www.federalregister.gov";
pub const AGENCY: &str = "federal-aviation-administration";
pub const DEFAULT_TERM: &str = "Airworthiness Directives";

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    results: Option<Vec<Document>>,
}

#[derive(Debug, Deserialize)]
struct Document {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    description: Option<String>,
    pdf_url: Option<String>,
    html_url: Option<String>,
    publication_date: Option<String>,
}

pub struct FederalRegisterProvider {
    mode: Mode,
    term: String,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

impl FederalRegisterProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            term: DEFAULT_TERM.to_string(),
        }
    }

    pub fn new(client: reqwest::Client, term: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http { client },
            term: term.into(),
        }
    }

    fn parse_items_from_str(&self, s: &str, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        let t0 = std::time::Instant::now();
        let resp: DocumentsResponse =
            serde_json::from_str(s).context("parsing federal register json")?;

        let mut out = Vec::new();
        for d in resp.results.unwrap_or_default() {
            if !window.admits(d.publication_date.as_deref()) {
                continue;
            }
            // Empty abstracts are common on ADs; fall back to the description.
            let abstract_text = d
                .abstract_text
                .as_deref()
                .filter(|a| !a.trim().is_empty())
                .or(d.description.as_deref())
                .unwrap_or_default();
            let url = non_blank(d.pdf_url.as_deref())
                .or(non_blank(d.html_url.as_deref()))
                .map(|u| absolutize(u, HOST));

            out.push(
                CandidateRecord::new(
                    SourceKind::FederalRegister,
                    d.title.as_deref(),
                    url,
                    abstract_text,
                    &self.term,
                )
                .with_published(d.publication_date.as_deref().and_then(parse_published)),
            );
        }

        histogram!("scrape_parse_ms", "provider" => "FAA").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }

    fn query_params(&self, window: &FetchWindow) -> Vec<(&'static str, String)> {
        vec![
            ("conditions[agencies][]", AGENCY.to_string()),
            ("conditions[type][]", "RULE".to_string()),
            ("conditions[type][]", "PRORULE".to_string()),
            ("conditions[term]", self.term.clone()),
            ("conditions[publication_date][gte]", window.since_date()),
            ("order", "newest".to_string()),
        ]
    }
}

#[async_trait]
impl SourceProvider for FederalRegisterProvider {
    async fn fetch_latest(&self, window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s, window),
            Mode::Http { client } => {
                let req = client
                    .get(DOCUMENTS_URL)
                    .query(&self.query_params(window));
                let body = fetch_body(req, "FAA").await?;
                self.parse_items_from_str(&body, window)
            }
        }
    }

    fn name(&self) -> &'static str {
        "FAA"
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
    fn html_url_used_when_pdf_missing_and_description_backs_abstract() {
        let body = r#"{"results":[{"title":"AD 2024-11-02","abstract":"",
            "description":"Cracks found in wing spar.","pdf_url":null,
            "html_url":"https://www.federalregister.gov/documents/2024/06/05/x",
            "publication_date":"2024-06-05"}]}"#;
        let p = FederalRegisterProvider::from_fixture_str(body);
        let out = p.parse_items_from_str(body, &window()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].url.as_deref(),
            Some("https://www.federalregister.gov/documents/2024/06/05/x")
        );
        assert_eq!(out[0].abstract_text, "Cracks found in wing spar.");
        assert_eq!(out[0].relevance, "Airworthiness Directives");
    }

    #[test]
    fn empty_link_fields_count_as_absent() {
        let body = r#"{"results":[
            {"title":"A","pdf_url":"","html_url":"https://www.federalregister.gov/documents/2024/06/05/x",
             "publication_date":"2024-06-05"},
            {"title":"B","pdf_url":" ","html_url":"","publication_date":"2024-06-05"}
        ]}"#;
        let p = FederalRegisterProvider::from_fixture_str(body);
        let out = p.parse_items_from_str(body, &window()).unwrap();
        assert_eq!(
            out[0].url.as_deref(),
            Some("https://www.federalregister.gov/documents/2024/06/05/x")
        );
        assert_eq!(out[1].url, None);
    }

    #[test]
    fn no_links_yields_none_url() {
        let body = r#"{"results":[{"title":"Orphan","publication_date":"2024-06-06"}]}"#;
        let p = FederalRegisterProvider::from_fixture_str(body);
        let out = p.parse_items_from_str(body, &window()).unwrap();
        assert_eq!(out[0].url, None);
    }

    #[test]
    fn query_carries_window_start_and_both_rule_types() {
        let p = FederalRegisterProvider::from_fixture_str("{}");
        let params = p.query_params(&window());
        assert!(params.contains(&("conditions[publication_date][gte]", "2024-06-01".to_string())));
        assert_eq!(
            params.iter().filter(|(k, _)| *k == "conditions[type][]").count(),
            2
        );
    }
}
