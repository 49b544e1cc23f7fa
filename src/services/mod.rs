//! Outbound service integrations.
//!
//! Every external call the assistant makes goes through one of these trait
//! seams so the session can be exercised with mock services in tests. The
//! production set is wired up by [`ServiceHub::production`].

pub mod media;
pub mod weather;
pub mod wiki;

use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use media::YoutubeMedia;
pub use weather::{WeatherReport, WttrWeather};
pub use wiki::{PageSummary, WikiSummaries};

/// User-Agent sent with weather/encyclopedia/media requests.
const APP_USER_AGENT: &str = concat!("elisa/", env!("CARGO_PKG_VERSION"));

/// HTTP timeout for the direct service calls (the search crate manages its
/// own timeout).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Web search returning ranked result links.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search the web and return up to `max_results` results.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<elisa_search::SearchResult>>;
}

/// Current-conditions weather lookup by city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the current conditions for `city`.
    async fn current(&self, city: &str) -> Result<WeatherReport>;
}

/// Encyclopedia page-and-summary lookup.
#[async_trait]
pub trait EncyclopediaProvider: Send + Sync {
    /// Fetch the summary of the page titled `title`. `Ok(None)` means the
    /// page does not exist.
    async fn summary(&self, title: &str) -> Result<Option<PageSummary>>;
}

/// Media launch by search query.
#[async_trait]
pub trait MediaLauncher: Send + Sync {
    /// Resolve `query` to a playable URL.
    async fn resolve(&self, query: &str) -> Result<String>;
}

/// URL-open action delegated to the OS.
pub trait UrlOpener: Send + Sync {
    /// Open `url` with the default handler.
    ///
    /// # Errors
    ///
    /// Returns an error when the OS refuses the request.
    fn open(&self, url: &str) -> Result<()>;
}

/// Embedded web search via the `elisa-search` crate.
pub struct WebSearch {
    config: elisa_search::SearchConfig,
}

impl WebSearch {
    /// Search with the default scraping configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: elisa_search::SearchConfig::default(),
        }
    }
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for WebSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<elisa_search::SearchResult>> {
        let config = elisa_search::SearchConfig {
            max_results,
            ..self.config.clone()
        };
        Ok(elisa_search::search(query, &config).await?)
    }
}

/// Opens URLs with the OS default handler.
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| AssistantError::Launch(format!("could not open {url}: {e}")))
    }
}

/// The full set of outbound services handed to the session.
#[derive(Clone)]
pub struct ServiceHub {
    /// Web search.
    pub search: Arc<dyn SearchProvider>,
    /// Weather lookup.
    pub weather: Arc<dyn WeatherProvider>,
    /// Encyclopedia lookup.
    pub encyclopedia: Arc<dyn EncyclopediaProvider>,
    /// Media launch.
    pub media: Arc<dyn MediaLauncher>,
    /// URL opening.
    pub opener: Arc<dyn UrlOpener>,
}

impl ServiceHub {
    /// Wire up the production services over a shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn production() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AssistantError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            search: Arc::new(WebSearch::new()),
            weather: Arc::new(WttrWeather::new(client.clone())),
            encyclopedia: Arc::new(WikiSummaries::new(client.clone())),
            media: Arc::new(YoutubeMedia::new(client)),
            opener: Arc::new(SystemOpener),
        })
    }
}
