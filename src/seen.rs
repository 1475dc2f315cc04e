// src/seen.rs
//! Persisted set of URLs already written to the research log.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Grows only: urls are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    urls: BTreeSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Returns true when the url was not seen before.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn is_superset(&self, other: &SeenSet) -> bool {
        self.urls.is_superset(&other.urls)
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// JSON-array backing file, rewritten wholesale on save.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or corrupt files load as an empty set.
    pub fn load(&self) -> SeenSet {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SeenSet::new(),
            Err(e) => {
                tracing::warn!(error = ?e, path = %self.path.display(), "seen-set unreadable; starting empty");
                return SeenSet::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(urls) => urls.into_iter().collect(),
            Err(e) => {
                tracing::warn!(error = ?e, path = %self.path.display(), "seen-set corrupt; starting empty");
                SeenSet::new()
            }
        }
    }

    /// Write to a sibling temp file, then rename over the target.
    pub fn save(&self, seen: &SeenSet) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating seen-set dir {}", dir.display()))?;
        }
        let urls: Vec<&str> = seen.iter().collect();
        let json = serde_json::to_string_pretty(&urls).context("serializing seen-set")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing seen-set at {}", self.path.display()))?;
        Ok(())
    }
}
