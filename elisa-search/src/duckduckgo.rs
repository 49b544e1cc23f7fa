//! DuckDuckGo HTML scraper.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::SearchResult;
use scraper::{Html, Selector};
use url::Url;

/// Perform one search against DuckDuckGo's HTML endpoint.
///
/// # Errors
///
/// Returns [`SearchError::Http`] when the request fails and
/// [`SearchError::Parse`] when the response cannot be parsed.
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>, SearchError> {
    tracing::trace!(query, "DuckDuckGo search");

    let client = http::build_client(config)?;

    let mut params = vec![("q", query)];
    if config.safe_search {
        params.push(("kp", "1"));
    }

    let response = client
        .post("https://html.duckduckgo.com/html/")
        .form(&params)
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("HTTP error: {e}")))?;

    let html = response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("response read failed: {e}")))?;

    tracing::trace!(bytes = html.len(), "DuckDuckGo response received");

    parse_results_html(&html, config.max_results)
}

/// Unwrap DuckDuckGo's redirect wrapper from a result link.
///
/// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`;
/// the real target is the URL-decoded `uddg` query parameter. Direct links
/// pass through unchanged.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

/// Parse a DuckDuckGo HTML response into search results.
///
/// Extracted as a separate function for testability with fixture HTML.
pub(crate) fn parse_results_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let title_el = match element.select(&title_sel).next() {
            Some(el) => el,
            None => continue,
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let href = match title_el.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        let url = match unwrap_redirect(href) {
            Some(u) => u,
            None => continue,
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
        });

        if results.len() >= max_results {
            break;
        }
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
