// src/verify.rs
//! PDF readability gate: a direct PDF link is only accepted when its first
//! page yields extractable text.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use lopdf::Document;
use std::time::Duration;

pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);
pub const SAMPLE_CHARS: usize = 500;

/// Cheap syntactic gate; everything else is treated as trivially readable.
pub fn is_pdf_url(url: &str) -> bool {
    url.to_ascii_lowercase().ends_with(".pdf")
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Readability {
    pub readable: bool,
    pub sample: String,
}

impl Readability {
    pub fn unreadable() -> Self {
        Self::default()
    }

    /// Readable iff the text has non-whitespace content; keeps the first 500 chars.
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::unreadable();
        }
        Self {
            readable: true,
            sample: text.chars().take(SAMPLE_CHARS).collect(),
        }
    }
}

#[async_trait]
pub trait PdfVerifier: Send + Sync {
    async fn verify(&self, url: &str) -> Readability;
}

/// Extract text from the first page only.
pub fn extract_first_page_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).context("loading pdf")?;
    let first = doc
        .get_pages()
        .keys()
        .next()
        .copied()
        .ok_or_else(|| anyhow!("pdf has no pages"))?;
    doc.extract_text(&[first]).context("extracting first page text")
}

pub struct HttpPdfVerifier {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPdfVerifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: VERIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .context("pdf http get()")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("pdf fetch returned HTTP {status}");
        }
        let bytes = resp.bytes().await.context("pdf http .bytes()")?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PdfVerifier for HttpPdfVerifier {
    async fn verify(&self, url: &str) -> Readability {
        tracing::debug!(url, "verifying pdf readability");
        let bytes = match self.fetch(url).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = ?e, url, "pdf download error");
                return Readability::unreadable();
            }
        };
        match extract_first_page_text(&bytes) {
            Ok(text) => Readability::from_text(&text),
            Err(e) => {
                tracing::warn!(error = ?e, url, "pdf parsing error");
                Readability::unreadable()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Single-page PDF with one line of Helvetica text (or no text when `None`).
    pub fn one_page_pdf(text: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let operations = match text {
            Some(t) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(t)]),
                Operation::new("ET", vec![]),
            ],
            None => Vec::new(),
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}
