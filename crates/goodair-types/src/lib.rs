//! Shared types for the Good Air Day air-quality dashboard.
//!
//! This crate provides the domain types used by every other goodair crate:
//! samples and pollutant readings, AQI categorization, locations, traffic
//! and weather observations, emission estimates, and user settings.
//!
//! # Features
//!
//! - NAQI severity categories with display colors and health advisories
//! - Rolling-window sample types with a fixed 288-sample capacity
//! - Location types with the device/IP/default source distinction
//! - Validated user settings
//!
//! # Example
//!
//! ```
//! use goodair_types::{AqiCategory, Settings};
//!
//! assert_eq!(AqiCategory::from_aqi(180), AqiCategory::Moderate);
//! assert!(Settings::default().validate().is_ok());
//! ```

pub mod aqi;
pub mod error;
pub mod location;
pub mod types;

pub use aqi::{AqiCategory, MAX_AQI};
pub use error::{ParseError, ParseResult};
pub use location::{Location, LocationSource};
pub use types::{
    AirQualitySample, CongestionLevel, EmissionEstimate, ForecastPoint, PollutantCode, Pollutants,
    RouteSegment, Settings, TrafficFlow, VehicleClass, WeatherObservation,
    DEFAULT_EMISSION_FACTOR, DEFAULT_NOTIFICATION_THRESHOLD, DEFAULT_REFRESH_INTERVAL_MS,
    REFRESH_INTERVALS_MS, SAMPLE_WINDOW_CAP,
};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // --- Cross-module behavior ---

    #[test]
    fn test_default_settings_below_max_aqi() {
        let s = Settings::default();
        assert!(s.notification_threshold <= MAX_AQI);
    }

    #[test]
    fn test_window_cap_covers_one_day_at_five_minutes() {
        assert_eq!(SAMPLE_WINDOW_CAP, 24 * 60 / 5);
    }

    #[test]
    fn test_fallback_location_is_valid() {
        let loc = Location::default_fallback();
        assert!(Location::try_new(loc.latitude, loc.longitude, loc.source).is_ok());
    }

    proptest! {
        // Category is monotone in AQI: a higher value never maps to a
        // less severe category.
        #[test]
        fn prop_category_monotone(a in 0u16..=1000, b in 0u16..=1000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(AqiCategory::from_aqi(lo) <= AqiCategory::from_aqi(hi));
        }

        #[test]
        fn prop_congestion_never_panics(cur in -100.0f32..1000.0, free in -100.0f32..1000.0) {
            let _ = CongestionLevel::from_speeds(cur, free);
        }

        #[test]
        fn prop_valid_coordinates_accepted(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert!(Location::try_new(lat, lon, LocationSource::Device).is_ok());
        }
    }
}
