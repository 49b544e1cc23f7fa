//! Encyclopedia lookups via the Wikipedia REST summary endpoint.
//!
//! `https://en.wikipedia.org/api/rest_v1/page/summary/{title}` returns the
//! lead-section extract for a page; a 404 means the page does not exist.

use super::EncyclopediaProvider;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;

/// Lead summary of one encyclopedia page.
#[derive(Debug, Clone)]
pub struct PageSummary {
    /// Display title of the page.
    pub title: String,
    /// First paragraph of the lead extract.
    pub extract: String,
}

/// Wikipedia REST API summary provider.
pub struct WikiSummaries {
    client: reqwest::Client,
}

impl WikiSummaries {
    /// Uses the shared service HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EncyclopediaProvider for WikiSummaries {
    async fn summary(&self, title: &str) -> Result<Option<PageSummary>> {
        let url = format!("https://en.wikipedia.org/api/rest_v1/page/summary/{title}");
        tracing::debug!(%title, "encyclopedia lookup");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AssistantError::Encyclopedia(format!("request failed: {e}")))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response
            .error_for_status()
            .map_err(|e| AssistantError::Encyclopedia(format!("HTTP error: {e}")))?
            .text()
            .await
            .map_err(|e| AssistantError::Encyclopedia(format!("response read failed: {e}")))?;
        parse_summary_json(&body).map(Some)
    }
}

/// Parse a REST summary response, keeping the first extract paragraph.
///
/// Extracted as a separate function for testability with fixture JSON.
pub(crate) fn parse_summary_json(body: &str) -> Result<PageSummary> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::Encyclopedia(format!("invalid JSON: {e}")))?;
    let title = value
        .get("title")
        .and_then(|t| t.as_str())
        .ok_or_else(|| AssistantError::Encyclopedia("missing title".into()))?
        .to_owned();
    let extract = value
        .get("extract")
        .and_then(|e| e.as_str())
        .ok_or_else(|| AssistantError::Encyclopedia("missing extract".into()))?;
    let first_paragraph = extract.split('\n').next().unwrap_or("").trim().to_owned();
    Ok(PageSummary {
        title,
        extract: first_paragraph,
    })
}

/// Derive the page title from a Wikipedia article URL (the last path
/// segment, e.g. `.../wiki/Marie_Curie` → `Marie_Curie`).
#[must_use]
pub fn title_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let title = trimmed.rsplit('/').next()?;
    if title.is_empty() {
        None
    } else {
        Some(title.to_owned())
    }
}
