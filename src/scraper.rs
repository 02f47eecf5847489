use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use crate::error::{AppError, Result};

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// Plenty of sites refuse requests that don't look like they come from a browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build HTTP client")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

/// Trims the raw URL and prepends `https://` when it carries no http(s) scheme.
///
/// Returns `None` for an empty or whitespace-only input.
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() {
        return None;
    }

    if has_http_scheme(url) {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// GETs `url` and returns the decoded body. Timeouts, connection failures and
/// non-2xx statuses all come back as `FetchError`.
pub async fn fetch_html(url: &str) -> Result<String> {
    let response = CLIENT
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| {
            tracing::error!(url, error = ?e, "Request error");
            AppError::from(e)
        })?;

    tracing::debug!(url, status = %response.status(), "Fetched page");
    let html = response.text().await?;
    Ok(html)
}

/// Text of every `<p>` element in document order, trimmed, empty ones dropped.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&PARAGRAPH_SELECTOR)
        .map(|element| element.text().collect::<String>())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
