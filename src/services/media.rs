//! Media launch by search: resolve a query to a playable YouTube URL.
//!
//! YouTube's results page embeds the result metadata as JSON inside a script
//! tag; the first `"videoId"` occurrence is the top result. When no id can
//! be found the search results page itself is returned so the user still
//! lands somewhere useful.

use super::MediaLauncher;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;

/// YouTube-backed media resolver.
pub struct YoutubeMedia {
    client: reqwest::Client,
}

impl YoutubeMedia {
    /// Uses the shared service HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaLauncher for YoutubeMedia {
    async fn resolve(&self, query: &str) -> Result<String> {
        let search_url = format!(
            "https://www.youtube.com/results?search_query={}",
            urlencoding::encode(query)
        );
        tracing::debug!(%query, "media lookup");
        let body = self
            .client
            .get(&search_url)
            .send()
            .await
            .map_err(|e| AssistantError::Launch(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AssistantError::Launch(format!("HTTP error: {e}")))?
            .text()
            .await
            .map_err(|e| AssistantError::Launch(format!("response read failed: {e}")))?;

        Ok(match extract_video_id(&body) {
            Some(id) => format!("https://www.youtube.com/watch?v={id}"),
            None => search_url,
        })
    }
}

/// Find the first video id embedded in a results page.
pub(crate) fn extract_video_id(html: &str) -> Option<String> {
    const MARKER: &str = "\"videoId\":\"";
    let start = html.find(MARKER)? + MARKER.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    let id = &rest[..end];
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Some(id.to_owned())
    } else {
        None
    }
}
