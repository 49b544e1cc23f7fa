//! # elisa-search
//!
//! Zero-configuration, embedded web search for Elisa.
//!
//! Provides web search by scraping DuckDuckGo's HTML-only endpoint directly:
//! no API keys, no external services, no user setup required. It compiles into
//! Elisa's binary as a library dependency.
//!
//! ## Design
//!
//! - POSTs to `html.duckduckgo.com/html/`, which needs no JavaScript and is
//!   tolerant of automated requests
//! - Parses results with CSS selectors and unwraps DuckDuckGo redirect URLs
//! - Rotates realistic browser User-Agents per request
//! - Search queries are logged only at trace level

pub mod config;
pub mod duckduckgo;
pub mod error;
pub mod http;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use types::SearchResult;

/// Search the web and return up to `config.max_results` results.
///
/// # Errors
///
/// Returns [`SearchError`] if the configuration is invalid, the HTTP request
/// fails, or the response HTML cannot be parsed.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> elisa_search::Result<()> {
/// let config = elisa_search::SearchConfig::default();
/// let results = elisa_search::search("rust programming", &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    config.validate()?;
    duckduckgo::search(query, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_rejects_zero_max_results() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("max_results"));
    }

    #[tokio::test]
    async fn search_rejects_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }
}
