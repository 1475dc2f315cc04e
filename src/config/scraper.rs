// src/config/scraper.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::providers::{arxiv, core_works, federal_register, ntrs};

pub const ENV_CONFIG_PATH: &str = "SCRAPER_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/scraper.toml";
pub const DEFAULT_JSON_PATH: &str = "config/scraper.json";
/// Ten years; larger windows are capped.
pub const MAX_WINDOW_DAYS: u32 = 3650;

fn default_seen_path() -> PathBuf {
    PathBuf::from("seen_ids.json")
}
fn default_log_path() -> PathBuf {
    PathBuf::from("Research_Log.md")
}
fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}
fn default_user_agent() -> String {
    "AerospaceScraper/1.0 (contact@example.com)".to_string()
}
fn default_window_days() -> u32 {
    7
}
fn default_page_size() -> u32 {
    25
}
fn default_ntrs_query() -> String {
    ntrs::DEFAULT_QUERY.to_string()
}
fn default_federal_register_term() -> String {
    federal_register::DEFAULT_TERM.to_string()
}
fn default_arxiv_query() -> String {
    arxiv::DEFAULT_QUERY.to_string()
}
fn default_core_query() -> String {
    core_works::DEFAULT_QUERY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_seen_path")]
    pub seen_path: PathBuf,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Recency window in days, upstream and local.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_ntrs_query")]
    pub ntrs_query: String,
    #[serde(default = "default_page_size")]
    pub ntrs_page_size: u32,
    #[serde(default = "default_federal_register_term")]
    pub federal_register_term: String,
    #[serde(default = "default_arxiv_query")]
    pub arxiv_query: String,
    #[serde(default = "default_page_size")]
    pub arxiv_max_results: u32,
    #[serde(default = "default_core_query")]
    pub core_query: String,
    #[serde(default = "default_page_size")]
    pub core_limit: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            seen_path: default_seen_path(),
            log_path: default_log_path(),
            download_dir: default_download_dir(),
            user_agent: default_user_agent(),
            window_days: default_window_days(),
            ntrs_query: default_ntrs_query(),
            ntrs_page_size: default_page_size(),
            federal_register_term: default_federal_register_term(),
            arxiv_query: default_arxiv_query(),
            arxiv_max_results: default_page_size(),
            core_query: default_core_query(),
            core_limit: default_page_size(),
        }
    }
}

impl ScraperConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scraper config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing scraper config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $SCRAPER_CONFIG_PATH
    /// 2) config/scraper.toml
    /// 3) config/scraper.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Ok(Self::default())
    }

    fn sanitize(&mut self) {
        if self.window_days == 0 {
            self.window_days = default_window_days();
        }
        self.window_days = self.window_days.min(MAX_WINDOW_DAYS);
        for n in [
            &mut self.ntrs_page_size,
            &mut self.arxiv_max_results,
            &mut self.core_limit,
        ] {
            *n = (*n).clamp(1, 100);
        }
        if self.user_agent.trim().is_empty() {
            self.user_agent = default_user_agent();
        }
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<ScraperConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("invalid json config");
    }
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!(toml_err))
            .context("unsupported config format"),
    }
}
