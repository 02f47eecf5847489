use serde::{Deserialize, Serialize};

use crate::pdf::DEFAULT_LABEL;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResult {
    pub status: ResultStatus,
    pub url: String,
    pub total_paragraphs: usize,
    pub paragraphs: Vec<String>,
}

impl ScrapeResult {
    pub fn success(url: String, paragraphs: Vec<String>) -> Self {
        ScrapeResult {
            status: ResultStatus::Success,
            url,
            total_paragraphs: paragraphs.len(),
            paragraphs,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PdfRequest {
    #[serde(default)]
    pub paragraphs: Option<Vec<String>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl PdfRequest {
    pub fn paragraphs(&self) -> &[String] {
        self.paragraphs.as_deref().unwrap_or_default()
    }

    /// Source label for the title; `null` and a missing key both fall back
    /// to the default.
    pub fn label(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_LABEL)
    }
}
