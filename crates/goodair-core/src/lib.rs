//! Fetchers, location resolution, and metric derivations for Good Air Day.
//!
//! This crate does the data work behind the dashboard: resolving where the
//! user is, pulling readings from the upstream APIs, and turning raw
//! measurements into the derived metrics the cards show.
//!
//! # Features
//!
//! - **Location resolution**: device position → IP geolocation → fixed
//!   default, each tier tried at most once
//! - **Air quality**: commercial current-conditions lookup plus the
//!   data.gov.in station feed
//! - **Traffic**: flow-segment fetch with density derivation and a
//!   zero-density fallback
//! - **Routes**: incident fetch mapped to congested segments
//! - **Weather**: current temperature and humidity
//! - **Emissions**: per-vehicle-class CO2e from traffic density, fetched
//!   through the rate-limit-aware retry path
//! - **Forecast**: synthetic hourly AQI series for the chart
//!
//! Fetchers are independent and best-effort: one source failing never
//! blocks the others, and each degrades the way its card expects.
//!
//! # Quick Start
//!
//! ```no_run
//! use goodair_core::{ApiClient, ApiConfig, LocationResolver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new()?;
//!     let config = ApiConfig::default();
//!
//!     let location = LocationResolver::new(client.clone(), config.clone())
//!         .resolve()
//!         .await;
//!     println!("Reporting for {}", location.city_label());
//!
//!     let traffic = goodair_core::traffic::fetch_flow_or_fallback(
//!         &client, &config, &location,
//!     ).await;
//!     println!("Traffic density: {}", traffic.density);
//!
//!     Ok(())
//! }
//! ```

pub mod airquality;
pub mod aqi;
pub mod client;
pub mod emissions;
pub mod error;
pub mod forecast;
pub mod init;
pub mod location;
pub mod retry;
pub mod routes;
pub mod traffic;
pub mod weather;

pub use airquality::{CurrentConditions, OpenDataSnapshot, StationRecord};
pub use aqi::percent_change;
pub use client::{ApiClient, ApiConfig};
pub use error::{Error, Result};
pub use init::{InitCell, InitGuard};
pub use location::{LocationResolver, PositionSource};
pub use retry::{RetryConfig, with_retry};
pub use routes::RoutesSummary;
pub use traffic::TrafficSummary;

#[cfg(test)]
mod tests {
    use super::*;
    use goodair_types::AqiCategory;

    // Derivations used together, the way a collector tick uses them.

    #[test]
    fn test_tick_pipeline_derivations() {
        let density = traffic::density(30.0, 50.0).unwrap();
        assert_eq!(density, 80);

        let distance = emissions::distance_for_density(f64::from(density));
        assert!((distance - 40.0).abs() < 1e-9);

        let change = percent_change(Some(100), 120);
        assert!((change - 20.0).abs() < 1e-9);

        assert_eq!(AqiCategory::from_aqi(120), AqiCategory::Moderate);
    }

    #[test]
    fn test_error_classification_is_consistent() {
        // The only retryable failures are transport, 429, and 5xx.
        assert!(retry::is_retryable(&Error::RateLimited {
            url: "u".to_string()
        }));
        assert!(!retry::is_retryable(&Error::InvalidResponse {
            service: "traffic",
            message: "m".to_string()
        }));
    }
}
