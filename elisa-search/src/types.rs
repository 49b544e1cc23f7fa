//! Core types for web search results.

use serde::{Deserialize, Serialize};

/// A single search result returned from the web.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result.
    pub url: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
}
