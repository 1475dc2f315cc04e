// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

pub const NO_TITLE: &str = "No Title";

/// One label per upstream adapter. Declaration order is the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SourceKind {
    Ntrs,
    FederalRegister,
    Arxiv,
    Core,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Ntrs => "NASA",
            SourceKind::FederalRegister => "FAA",
            SourceKind::Arxiv => "arXiv",
            SourceKind::Core => "CORE",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CandidateRecord {
    pub title: String,
    pub url: Option<String>, // dedup key across all sources
    pub abstract_text: String,
    pub source: SourceKind,
    pub relevance: String, // why the record matched
    pub published: Option<DateTime<Utc>>,
}

impl CandidateRecord {
    /// Builds a record, substituting the placeholder for a missing or blank title.
    pub fn new(
        source: SourceKind,
        title: Option<&str>,
        url: Option<String>,
        abstract_text: &str,
        relevance: &str,
    ) -> Self {
        let title = title
            .map(crate::ingest::normalize_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());
        Self {
            title,
            url: url.filter(|u| !u.trim().is_empty()),
            abstract_text: crate::ingest::normalize_text(abstract_text),
            source,
            relevance: relevance.to_string(),
            published: None,
        }
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }
}

/// Recency window applied by every adapter, upstream and locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl FetchWindow {
    /// Saturates at the earliest representable instant.
    pub fn last_days(now: DateTime<Utc>, days: u32) -> Self {
        let since = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { since, until: now }
    }

    /// `YYYY-MM-DD` of the window start, for upstream query parameters.
    pub fn since_date(&self) -> String {
        self.since.format("%Y-%m-%d").to_string()
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self, window: &FetchWindow) -> Result<Vec<CandidateRecord>>;
    fn name(&self) -> &'static str;
}
