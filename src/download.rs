// src/download.rs
//! Optional retrieval of accepted PDF documents into a local directory.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_STEM_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    AlreadyPresent(PathBuf),
}

/// File name for a downloaded document: sanitized title stem, capped, plus `.pdf`.
pub fn pdf_file_name(title: &str) -> String {
    let mut stem = String::new();
    for word in title.split_whitespace() {
        let clean: String = word
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            .collect();
        if clean.is_empty() {
            continue;
        }
        if !stem.is_empty() {
            stem.push('_');
        }
        stem.push_str(&clean);
    }
    stem.truncate(MAX_STEM_CHARS);
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "document.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, title: &str, url: &str) -> Result<DownloadOutcome>;
}

pub struct FsDownloader {
    dir: PathBuf,
    client: reqwest::Client,
    timeout: Duration,
}

impl FsDownloader {
    pub fn new(dir: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            dir: dir.into(),
            client,
            timeout: DOWNLOAD_TIMEOUT,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Downloader for FsDownloader {
    async fn download(&self, title: &str, url: &str) -> Result<DownloadOutcome> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating download dir {}", self.dir.display()))?;

        let target = self.dir.join(pdf_file_name(title));
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Ok(DownloadOutcome::AlreadyPresent(target));
        }

        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .context("download http get()")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("download returned HTTP {status}");
        }
        let bytes = resp.bytes().await.context("download http .bytes()")?;
        if !bytes.starts_with(b"%PDF") {
            bail!("response from {url} is not a pdf");
        }

        tokio::fs::write(&target, &bytes)
            .await
            .with_context(|| format!("writing {}", target.display()))?;
        Ok(DownloadOutcome::Saved(target))
    }
}
