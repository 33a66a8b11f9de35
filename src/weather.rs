//! Upstream weather provider client.
//!
//! A thin wrapper over one GET request to an OpenWeatherMap-compatible
//! endpoint. The client carries an explicit request timeout so a stalled
//! upstream cannot hold a request context indefinitely. Responses are kept
//! as raw JSON bodies; the proxy never interprets them beyond the status
//! code.

use crate::config::WeatherConfig;
use crate::errors::Error;
use url::Url;

/// Outcome of one upstream fetch.
#[derive(Debug, Clone)]
pub struct UpstreamWeather {
    pub success: bool,
    pub body: String,
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    units: String,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Internal {
                operation: format!("build weather HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            units: config.units.clone(),
        })
    }

    /// Fetch current weather for a location query (city name or postcode).
    ///
    /// Upstream non-200 responses are reported through
    /// [`UpstreamWeather::success`], not as errors: the proxy turns them into
    /// a structured payload rather than a failed request. Only transport
    /// failures (timeout, connection refused) surface as `Err`.
    #[tracing::instrument(skip(self), err)]
    pub async fn fetch(&self, location: &str) -> Result<UpstreamWeather, Error> {
        let api_key = self.api_key.as_deref().ok_or_else(|| Error::Internal {
            operation: "weather API key is not configured".to_string(),
        })?;

        let response = self
            .http
            .get(self.base_url.clone())
            .query(&[("q", location), ("appid", api_key), ("units", &self.units)])
            .send()
            .await
            .map_err(|e| Error::Internal {
                // reqwest redacts the URL's sensitive parts, but keep the key
                // out of the message entirely
                operation: format!("request weather for '{location}': {}", e.without_url()),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Internal {
            operation: format!("read weather response for '{location}': {}", e.without_url()),
        })?;

        if !status.is_success() {
            tracing::warn!(%status, location, "upstream weather request failed");
        }

        Ok(UpstreamWeather {
            success: status.is_success(),
            body,
        })
    }
}
