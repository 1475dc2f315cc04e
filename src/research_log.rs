// src/research_log.rs
//! Markdown research log: entry formatting and the append-only sink.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ingest::types::CandidateRecord;

pub const NO_ABSTRACT: &str = "No abstract available.";
const SUMMARY_SENTENCES: usize = 3;

/// First three sentences of the abstract, followed by `...` when more remain.
pub fn summarize(abstract_text: &str) -> String {
    if abstract_text.trim().is_empty() {
        return NO_ABSTRACT.to_string();
    }
    let flat = abstract_text.replace('\r', "").replace('\n', " ");
    let sentences: Vec<&str> = flat.split(". ").collect();
    let mut summary = sentences
        .iter()
        .take(SUMMARY_SENTENCES)
        .copied()
        .collect::<Vec<_>>()
        .join(". ");
    if sentences.len() > SUMMARY_SENTENCES {
        // The split ate the last kept sentence's period.
        if !summary.ends_with('.') {
            summary.push('.');
        }
        summary.push_str("...");
    }
    summary
}

pub fn format_entry(rec: &CandidateRecord, url: &str, date: NaiveDate) -> String {
    format!(
        "\n### [{date}] {title}\n**Source:** {url}\n**Relevance:** {relevance}\n**Summary:**\n> {summary}\n---\n",
        date = date.format("%Y-%m-%d"),
        title = rec.title,
        relevance = rec.relevance,
        summary = summarize(&rec.abstract_text),
    )
}

pub trait LogSink: Send + Sync {
    /// Append one formatted block. Existing content is never touched.
    fn append(&self, block: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct MarkdownLog {
    path: PathBuf,
}

impl MarkdownLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for MarkdownLog {
    fn append(&self, block: &str) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening research log {}", self.path.display()))?;
        f.write_all(block.as_bytes())
            .with_context(|| format!("appending to {}", self.path.display()))
    }
}
