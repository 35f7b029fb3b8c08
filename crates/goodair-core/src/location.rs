//! Three-tier location resolution.
//!
//! Resolution order, most to least accurate:
//!
//! 1. A platform position source (bounded wait), reverse-geocoded to a
//!    city/country pair. Geocoding failure keeps the coordinates.
//! 2. IP geolocation.
//! 3. The fixed default location.
//!
//! Each tier is attempted at most once per call; there are no retries
//! inside a tier. Resolution itself never fails (the worst case is the
//! default location), but every downgrade is logged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use goodair_types::{Location, LocationSource};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::{ApiClient, ApiConfig};
use crate::error::{Error, Result};

/// How long to wait for the platform position source.
pub const POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// Cached positions up to this old are acceptable.
pub const POSITION_MAX_AGE: Duration = Duration::from_secs(5 * 60);

/// A platform-specific provider of raw coordinates.
///
/// Implementations may block on hardware (GNSS) or an OS location service;
/// the resolver bounds the wait with [`POSITION_TIMEOUT`]. A cached
/// position no older than [`POSITION_MAX_AGE`] is acceptable.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Return a (latitude, longitude) fix.
    async fn position(&self) -> Result<(f64, f64)>;
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    city: String,
    #[serde(rename = "countryName", default)]
    country_name: String,
}

#[derive(Deserialize)]
struct IpLookupResponse {
    location: Option<IpLocation>,
}

#[derive(Deserialize)]
struct IpLocation {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Resolves the dashboard's location through the fallback chain.
pub struct LocationResolver {
    client: ApiClient,
    config: ApiConfig,
    position_source: Option<Arc<dyn PositionSource>>,
}

impl LocationResolver {
    /// Create a resolver without a platform position source (tiers 2-3 only).
    pub fn new(client: ApiClient, config: ApiConfig) -> Self {
        Self {
            client,
            config,
            position_source: None,
        }
    }

    /// Attach a platform position source, enabling tier 1.
    #[must_use]
    pub fn with_position_source(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.position_source = Some(source);
        self
    }

    /// Resolve a location, falling through the tiers as needed.
    pub async fn resolve(&self) -> Location {
        match self.try_device().await {
            Ok(location) => return location,
            Err(e) => warn!("device position unavailable, trying IP geolocation: {e}"),
        }

        match self.try_ip().await {
            Ok(location) => return location,
            Err(e) => warn!("IP geolocation failed, using default location: {e}"),
        }

        Location::default_fallback()
    }

    /// Tier 1: platform position plus reverse geocoding.
    async fn try_device(&self) -> Result<Location> {
        let source = self
            .position_source
            .as_ref()
            .ok_or_else(|| Error::PositionUnavailable("no position source".to_string()))?;

        let (latitude, longitude) = tokio::time::timeout(POSITION_TIMEOUT, source.position())
            .await
            .map_err(|_| {
                Error::PositionUnavailable(format!(
                    "no fix within {}s",
                    POSITION_TIMEOUT.as_secs()
                ))
            })??;

        let mut location = Location::try_new(latitude, longitude, LocationSource::Device)?;

        // Geocoding is best-effort: on failure the coordinates still stand
        // and the labels fall back to the Unknown placeholders.
        match self.reverse_geocode(latitude, longitude).await {
            Ok((city, country)) => {
                location.city = city;
                location.country = country;
            }
            Err(e) => warn!("reverse geocoding failed, keeping bare coordinates: {e}"),
        }

        debug!(
            "resolved device location ({}, {}) as {}",
            latitude,
            longitude,
            location.city_label()
        );
        Ok(location)
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<(Option<String>, Option<String>)> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let response: GeocodeResponse = self
            .client
            .get_json(
                &self.config.geocode_url,
                &[
                    ("latitude", lat.as_str()),
                    ("longitude", lon.as_str()),
                    ("localityLanguage", "en"),
                ],
            )
            .await?;

        let city = (!response.city.is_empty()).then_some(response.city);
        let country = (!response.country_name.is_empty()).then_some(response.country_name);
        Ok((city, country))
    }

    /// Tier 2: approximate position from the public IP.
    async fn try_ip(&self) -> Result<Location> {
        let response: IpLookupResponse = self
            .client
            .get_json(&self.config.ip_lookup_url, &[])
            .await?;

        let ip = response.location.ok_or(Error::InvalidResponse {
            service: "ip-lookup",
            message: "response has no location object".to_string(),
        })?;

        let mut location = Location::try_new(ip.latitude, ip.longitude, LocationSource::Ip)?;
        location.city = ip.city;
        location.country = ip.country;
        debug!("resolved IP location as {}", location.city_label());
        Ok(location)
    }
}
