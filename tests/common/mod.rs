// tests/common/mod.rs
#![allow(dead_code)]

use aero_scraper::download::{DownloadOutcome, Downloader};
use aero_scraper::ingest::types::{CandidateRecord, FetchWindow, SourceKind, SourceProvider};
use aero_scraper::research_log::LogSink;
use aero_scraper::verify::{PdfVerifier, Readability};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

pub fn window() -> FetchWindow {
    FetchWindow::last_days(Utc.with_ymd_and_hms(2024, 6, 8, 12, 0, 0).unwrap(), 7)
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
}

pub fn rec(source: SourceKind, title: &str, url: Option<&str>) -> CandidateRecord {
    CandidateRecord::new(
        source,
        Some(title),
        url.map(str::to_string),
        "First. Second. Third. Fourth.",
        "test relevance",
    )
}

pub struct StaticProvider {
    pub name: &'static str,
    pub items: Vec<CandidateRecord>,
}

#[async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self, _window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct FailingProvider;

#[async_trait]
impl SourceProvider for FailingProvider {
    async fn fetch_latest(&self, _window: &FetchWindow) -> Result<Vec<CandidateRecord>> {
        Err(anyhow!("upstream returned HTTP 503"))
    }
    fn name(&self) -> &'static str {
        "Failing"
    }
}

/// Reports readable only for urls in `readable`; records every call.
#[derive(Default)]
pub struct ScriptedVerifier {
    pub readable: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedVerifier {
    pub fn readable<I: IntoIterator<Item = &'static str>>(urls: I) -> Self {
        Self {
            readable: urls.into_iter().map(str::to_string).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfVerifier for ScriptedVerifier {
    async fn verify(&self, url: &str) -> Readability {
        self.calls.lock().unwrap().push(url.to_string());
        if self.readable.contains(url) {
            Readability::from_text("Readable first page")
        } else {
            Readability::unreadable()
        }
    }
}

#[derive(Default)]
pub struct MemoryLog {
    pub blocks: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn blocks(&self) -> Vec<String> {
        self.blocks.lock().unwrap().clone()
    }
}

impl LogSink for MemoryLog {
    fn append(&self, block: &str) -> Result<()> {
        self.blocks.lock().unwrap().push(block.to_string());
        Ok(())
    }
}

pub struct BrokenLog;

impl LogSink for BrokenLog {
    fn append(&self, _block: &str) -> Result<()> {
        Err(anyhow!("disk full"))
    }
}

#[derive(Default)]
pub struct RecordingDownloader {
    pub calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Downloader for RecordingDownloader {
    async fn download(&self, title: &str, url: &str) -> Result<DownloadOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((title.to_string(), url.to_string()));
        Ok(DownloadOutcome::Saved(PathBuf::from(format!("/tmp/{title}.pdf"))))
    }
}
