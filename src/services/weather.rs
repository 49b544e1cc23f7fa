//! Current-conditions weather lookup via wttr.in.
//!
//! wttr.in serves a JSON view of the current conditions at
//! `https://wttr.in/{city}?format=j1` with no API key.

use super::WeatherProvider;
use crate::error::{AssistantError, Result};
use async_trait::async_trait;

/// Current conditions for one city.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    /// City the report is for (as requested).
    pub city: String,
    /// Short condition description ("Partly cloudy").
    pub description: String,
    /// Temperature in Celsius.
    pub temp_c: String,
    /// Temperature in Fahrenheit.
    pub temp_f: String,
    /// Relative humidity percentage.
    pub humidity: String,
}

impl WeatherReport {
    /// One-line summary for display and speech.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Weather in {}: {}, {}°C ({}°F), Humidity: {}%",
            self.city, self.description, self.temp_c, self.temp_f, self.humidity
        )
    }
}

/// wttr.in-backed weather provider.
pub struct WttrWeather {
    client: reqwest::Client,
}

impl WttrWeather {
    /// Uses the shared service HTTP client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WeatherProvider for WttrWeather {
    async fn current(&self, city: &str) -> Result<WeatherReport> {
        let url = format!("https://wttr.in/{}?format=j1", urlencoding::encode(city));
        tracing::debug!(%city, "weather lookup");
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AssistantError::Weather(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AssistantError::Weather(format!("HTTP error: {e}")))?
            .text()
            .await
            .map_err(|e| AssistantError::Weather(format!("response read failed: {e}")))?;
        parse_wttr_json(city, &body)
    }
}

/// Parse a wttr.in `format=j1` response.
///
/// Extracted as a separate function for testability with fixture JSON.
pub(crate) fn parse_wttr_json(city: &str, body: &str) -> Result<WeatherReport> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AssistantError::Weather(format!("invalid JSON: {e}")))?;
    let current = value
        .get("current_condition")
        .and_then(|c| c.get(0))
        .ok_or_else(|| AssistantError::Weather("missing current_condition".into()))?;

    let field = |name: &str| -> Result<String> {
        current
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or_else(|| AssistantError::Weather(format!("missing field {name}")))
    };

    let description = current
        .get("weatherDesc")
        .and_then(|d| d.get(0))
        .and_then(|d| d.get("value"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| AssistantError::Weather("missing weatherDesc".into()))?
        .to_owned();

    Ok(WeatherReport {
        city: city.to_owned(),
        description,
        temp_c: field("temp_C")?,
        temp_f: field("temp_F")?,
        humidity: field("humidity")?,
    })
}
