//! Vehicle CO2e estimates derived from traffic density.

use goodair_types::{EmissionEstimate, Location, VehicleClass};
use time::OffsetDateTime;
use tracing::warn;

use crate::client::{ApiClient, ApiConfig};
use crate::error::Result;
use crate::retry::{RetryConfig, with_retry};
use crate::traffic::{self, TrafficSummary};

/// Shortest trip distance assumed, km.
pub const MIN_DISTANCE_KM: f64 = 10.0;

/// Longest trip distance assumed, km.
pub const MAX_DISTANCE_KM: f64 = 50.0;

/// Trip distance implied by a traffic density in [0, 100].
///
/// Denser traffic implies longer time spent on the road, modeled as a
/// linear scale up to [`MAX_DISTANCE_KM`] and clamped to
/// [[`MIN_DISTANCE_KM`], [`MAX_DISTANCE_KM`]]. A non-finite density falls
/// back to the maximum with a warning.
#[must_use]
pub fn distance_for_density(density: f64) -> f64 {
    if !density.is_finite() {
        warn!("non-finite traffic density {density}, assuming maximum trip distance");
        return MAX_DISTANCE_KM;
    }
    (MAX_DISTANCE_KM * density / 100.0).clamp(MIN_DISTANCE_KM, MAX_DISTANCE_KM)
}

/// Per-class CO2e estimates for the trip distance implied by `density`.
#[must_use]
pub fn estimate(density: f64, timestamp: OffsetDateTime) -> Vec<EmissionEstimate> {
    let distance_km = distance_for_density(density);
    VehicleClass::ALL
        .iter()
        .map(|&vehicle| EmissionEstimate {
            vehicle,
            distance_km,
            co2e_kg: vehicle.emission_factor() * distance_km,
            timestamp,
        })
        .collect()
}

/// Fetch current traffic and derive per-class emission estimates.
///
/// The flow endpoint backing this is quota-limited, so this is the one
/// fetch that goes through the retry path: 429s and transport errors are
/// retried with backoff, anything else is terminal.
///
/// # Errors
///
/// Returns the underlying fetch error, or
/// [`crate::Error::RetriesExhausted`] when every attempt was rate limited.
pub async fn fetch_estimates(
    client: &ApiClient,
    config: &ApiConfig,
    location: &Location,
) -> Result<(TrafficSummary, Vec<EmissionEstimate>)> {
    let retry = RetryConfig::for_rate_limited();
    let summary = with_retry(&retry, "fetch_emissions_flow", || {
        traffic::fetch_flow(client, config, location)
    })
    .await?;

    let estimates = estimate(f64::from(summary.density), OffsetDateTime::now_utc());
    Ok((summary, estimates))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_scales_with_density() {
        assert!((distance_for_density(100.0) - 50.0).abs() < 1e-9);
        assert!((distance_for_density(50.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_clamps_low() {
        // 50 * 10/100 = 5, below the floor
        assert!((distance_for_density(10.0) - 10.0).abs() < 1e-9);
        assert!((distance_for_density(0.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_clamps_high() {
        assert!((distance_for_density(250.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_non_finite_defaults_to_max() {
        assert!((distance_for_density(f64::NAN) - 50.0).abs() < 1e-9);
        assert!((distance_for_density(f64::INFINITY) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_covers_all_classes() {
        let estimates = estimate(100.0, OffsetDateTime::UNIX_EPOCH);
        assert_eq!(estimates.len(), 3);

        let small = &estimates[0];
        assert_eq!(small.vehicle, VehicleClass::SmallCar);
        assert!((small.distance_km - 50.0).abs() < 1e-9);
        assert!((small.co2e_kg - 0.14231 * 50.0).abs() < 1e-9);

        let large = &estimates[2];
        assert_eq!(large.vehicle, VehicleClass::LargeCar);
        assert!((large.co2e_kg - 0.21424 * 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimates_ordered_by_size() {
        let estimates = estimate(60.0, OffsetDateTime::UNIX_EPOCH);
        assert!(estimates[0].co2e_kg < estimates[1].co2e_kg);
        assert!(estimates[1].co2e_kg < estimates[2].co2e_kg);
    }
}
