// src/ingest/window.rs
//! Publication-date parsing for the local recency re-check.
//!
//! Every adapter re-checks the parsed date locally on top of the upstream
//! filter. Dates that can't be parsed are admitted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ingest::types::FetchWindow;

/// Parse the date shapes seen across the upstream APIs:
/// RFC 3339 (`2024-06-03T17:59:58Z`, `2013-08-10T00:01:00.0000000+00:00`),
/// naive timestamps (`2024-06-03T10:00:00`, optional fraction) and bare dates.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    // Bare date, possibly followed by junk we don't care about.
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl FetchWindow {
    /// Fail-open: missing or unparsable dates are kept.
    pub fn admits(&self, published: Option<&str>) -> bool {
        match published.and_then(parse_published) {
            Some(dt) => dt >= self.since,
            None => true,
        }
    }
}
