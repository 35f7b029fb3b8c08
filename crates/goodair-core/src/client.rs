//! Shared HTTP client for the upstream data sources.
//!
//! Every fetcher goes through [`ApiClient`], which applies a uniform request
//! timeout and turns non-success responses into structured errors, pulling
//! the upstream's own error message out of the body when one is present.

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Default request timeout for all upstream calls.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// API keys and base URLs for the upstream data sources.
///
/// Defaults point at the public production endpoints; keys default to `None`
/// and must be supplied through service/CLI configuration or environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Key for the commercial air-quality API.
    pub air_quality_key: Option<String>,
    /// Key for data.gov.in open-data resources.
    pub open_data_key: Option<String>,
    /// Key for the TomTom traffic APIs.
    pub traffic_key: Option<String>,
    /// Key for OpenWeatherMap.
    pub weather_key: Option<String>,
    /// Current-conditions lookup endpoint.
    pub air_quality_url: String,
    /// Open-data station resource endpoint.
    pub open_data_url: String,
    /// Flow-segment endpoint.
    pub traffic_url: String,
    /// Incident-details endpoint.
    pub incidents_url: String,
    /// Current-weather endpoint.
    pub weather_url: String,
    /// Reverse-geocoding endpoint.
    pub geocode_url: String,
    /// IP-geolocation endpoint.
    pub ip_lookup_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            air_quality_key: None,
            open_data_key: None,
            traffic_key: None,
            weather_key: None,
            air_quality_url: "https://airquality.googleapis.com/v1/currentConditions:lookup"
                .to_string(),
            open_data_url:
                "https://api.data.gov.in/resource/3b01bcb8-0b14-4abf-b6f2-c1bfd384ba69".to_string(),
            traffic_url:
                "https://api.tomtom.com/traffic/services/4/flowSegmentData/absolute/10/json"
                    .to_string(),
            incidents_url: "https://api.tomtom.com/traffic/services/5/incidentDetails".to_string(),
            weather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            geocode_url: "https://api.bigdatacloud.net/data/reverse-geocode-client".to_string(),
            ip_lookup_url: "https://api.ipapi.is/".to_string(),
        }
    }
}

/// HTTP client shared by all fetchers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    /// Create a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] if the underlying client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Request)?;
        Ok(Self { client })
    }

    /// Create a client from a custom reqwest Client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GET a URL with query parameters and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self.client.get(url).query(query).send().await?;
        Self::handle_response(url, response).await
    }

    /// POST a JSON body with query parameters and deserialize the JSON reply.
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        let response = self.client.post(url).query(query).json(body).send().await?;
        Self::handle_response(url, response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(Error::Request);
        }

        if status.as_u16() == 429 {
            return Err(Error::RateLimited {
                url: url.to_string(),
            });
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| extract_error_message(&v))
            .unwrap_or_else(|| status.to_string());

        Err(Error::Http {
            status: status.as_u16(),
            url: url.to_string(),
            message,
        })
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// Handles both `{"error": "..."}` and the `{"error": {"message": "..."}}`
/// shape the commercial APIs use.
fn extract_error_message(body: &serde_json::Value) -> Option<String> {
    match body.get("error")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from),
        _ => None,
    }
}
