// src/ingest/providers/mod.rs
pub mod arxiv;
pub mod core_works;
pub mod federal_register;
pub mod ntrs;

use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Shared client for adapter fetches. No per-request timeout beyond this default.
pub fn build_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(15))
        .build()
        .context("building http client")
}

/// Send a request and return the body of a 2xx response.
pub(crate) async fn fetch_body(req: reqwest::RequestBuilder, provider: &'static str) -> Result<String> {
    let resp = req
        .send()
        .await
        .with_context(|| format!("{provider} http get()"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("{provider} returned HTTP {status}");
    }
    resp.text()
        .await
        .with_context(|| format!("{provider} http .text()"))
}

/// Empty link fields are as good as missing.
pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|u| !u.trim().is_empty())
}

/// Upstream ids come back as numbers from some APIs and strings from others.
pub(crate) fn id_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_string_accepts_numbers_and_strings() {
        assert_eq!(id_string(&json!(20240001234u64)), Some("20240001234".into()));
        assert_eq!(id_string(&json!(" 42 ")), Some("42".into()));
        assert_eq!(id_string(&json!("")), None);
        assert_eq!(id_string(&json!(null)), None);
    }

    #[test]
    fn non_blank_drops_empty_and_whitespace() {
        assert_eq!(non_blank(Some("/a.pdf")), Some("/a.pdf"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
