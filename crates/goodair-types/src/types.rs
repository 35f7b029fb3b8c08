//! Core types for air-quality, traffic, weather, and emissions data.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::aqi::AqiCategory;
use crate::error::ParseError;

/// Maximum number of samples retained in the rolling window
/// (24 hours at 5-minute resolution).
pub const SAMPLE_WINDOW_CAP: usize = 288;

/// Pollutant identifiers tracked per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum PollutantCode {
    /// Fine particulate matter (< 2.5 µm).
    Pm25,
    /// Coarse particulate matter (< 10 µm).
    Pm10,
    /// Nitrogen dioxide.
    No2,
    /// Ozone.
    O3,
    /// Carbon monoxide.
    Co,
}

impl fmt::Display for PollutantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollutantCode::Pm25 => write!(f, "pm25"),
            PollutantCode::Pm10 => write!(f, "pm10"),
            PollutantCode::No2 => write!(f, "no2"),
            PollutantCode::O3 => write!(f, "o3"),
            PollutantCode::Co => write!(f, "co"),
        }
    }
}

/// Pollutant concentrations for one reading.
///
/// Particulates and gases are in µg/m³ except CO, which is in mg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pollutants {
    /// PM2.5 concentration.
    pub pm25: f32,
    /// PM10 concentration.
    pub pm10: f32,
    /// NO2 concentration.
    pub no2: f32,
    /// O3 concentration.
    pub o3: f32,
    /// CO concentration.
    pub co: f32,
}

impl Pollutants {
    /// The pollutant with the highest concentration, ignoring unit
    /// differences (matches how the dashboard picks a headline pollutant).
    #[must_use]
    pub fn dominant(&self) -> PollutantCode {
        let candidates = [
            (PollutantCode::Pm25, self.pm25),
            (PollutantCode::Pm10, self.pm10),
            (PollutantCode::No2, self.no2),
            (PollutantCode::O3, self.o3),
            (PollutantCode::Co, self.co),
        ];
        candidates
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .fold((PollutantCode::Pm25, f32::MIN), |best, cur| {
                if cur.1 > best.1 { cur } else { best }
            })
            .0
    }
}

/// A single air-quality sample in the rolling window.
///
/// Samples are append-only: created by a successful fetch, never mutated,
/// destroyed only by an explicit clear.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AirQualitySample {
    /// When the sample was captured.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: time::OffsetDateTime,
    /// AQI value on the NAQI scale.
    pub aqi: u16,
    /// Pollutant concentrations.
    pub pollutants: Pollutants,
}

impl AirQualitySample {
    /// Severity category for this sample's AQI.
    #[must_use]
    pub fn category(&self) -> AqiCategory {
        AqiCategory::from_aqi(self.aqi)
    }
}

/// Refresh intervals (milliseconds) the dashboard may be configured with.
pub const REFRESH_INTERVALS_MS: [u64; 5] = [60_000, 300_000, 600_000, 1_800_000, 3_600_000];

/// Default notification threshold (AQI).
pub const DEFAULT_NOTIFICATION_THRESHOLD: u16 = 150;

/// Default refresh interval (5 minutes).
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 300_000;

/// User-adjustable settings, persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// AQI value above which a notification is raised, [0, 500].
    pub notification_threshold: u16,
    /// Refresh interval in milliseconds, one of [`REFRESH_INTERVALS_MS`].
    pub refresh_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_threshold: DEFAULT_NOTIFICATION_THRESHOLD,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Validate field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if the threshold exceeds 500 or
    /// the refresh interval is not one of the supported values.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.notification_threshold > crate::aqi::MAX_AQI {
            return Err(ParseError::InvalidValue(format!(
                "notification threshold {} exceeds maximum of {}",
                self.notification_threshold,
                crate::aqi::MAX_AQI
            )));
        }
        if !REFRESH_INTERVALS_MS.contains(&self.refresh_interval_ms) {
            return Err(ParseError::InvalidValue(format!(
                "refresh interval {} ms is not one of the supported intervals",
                self.refresh_interval_ms
            )));
        }
        Ok(())
    }
}

/// Traffic flow measurements for a road segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrafficFlow {
    /// Measured speed in km/h.
    pub current_speed: f32,
    /// Speed achievable absent congestion, in km/h.
    pub free_flow_speed: f32,
    /// Provider confidence in the measurement, [0, 1].
    pub confidence: f32,
}

/// Congestion severity for a road segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CongestionLevel {
    /// Traffic is moving at more than 70% of free-flow speed.
    Low,
    /// Traffic is moving at 40-70% of free-flow speed.
    Medium,
    /// Traffic is moving at less than 40% of free-flow speed.
    High,
}

impl CongestionLevel {
    /// Classify congestion from a current/free-flow speed pair.
    ///
    /// A non-positive free-flow speed is treated as fully congested.
    #[must_use]
    pub fn from_speeds(current_speed: f32, free_flow_speed: f32) -> Self {
        if free_flow_speed <= 0.0 {
            return CongestionLevel::High;
        }
        let ratio = current_speed / free_flow_speed;
        if ratio > 0.7 {
            CongestionLevel::Low
        } else if ratio > 0.4 {
            CongestionLevel::Medium
        } else {
            CongestionLevel::High
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongestionLevel::Low => write!(f, "low"),
            CongestionLevel::Medium => write!(f, "medium"),
            CongestionLevel::High => write!(f, "high"),
        }
    }
}

/// One affected road segment derived from an active traffic incident.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSegment {
    /// Provider incident identifier.
    pub id: String,
    /// Estimated speed through the segment, km/h.
    pub current_speed: f32,
    /// Assumed free-flow speed, km/h.
    pub free_flow_speed: f32,
    /// Congestion severity.
    pub congestion: CongestionLevel,
    /// Segment geometry as (longitude, latitude) pairs.
    pub coordinates: Vec<[f64; 2]>,
}

/// Current weather conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeatherObservation {
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity percentage (0-100).
    pub humidity: u8,
    /// When the observation was fetched.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: time::OffsetDateTime,
}

/// Vehicle classes with per-kilometre emission factors.
///
/// Factors are the UK BEIS figures in kg CO2e per km.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum VehicleClass {
    /// Small passenger car.
    SmallCar,
    /// Medium passenger car.
    MediumCar,
    /// Large passenger car.
    LargeCar,
}

/// Emission factor applied when a vehicle class has no published figure.
pub const DEFAULT_EMISSION_FACTOR: f64 = 0.15;

impl VehicleClass {
    /// All classes, in display order.
    pub const ALL: [VehicleClass; 3] = [
        VehicleClass::SmallCar,
        VehicleClass::MediumCar,
        VehicleClass::LargeCar,
    ];

    /// Emission factor in kg CO2e per km.
    #[must_use]
    pub fn emission_factor(&self) -> f64 {
        match self {
            VehicleClass::SmallCar => 0.14231,
            VehicleClass::MediumCar => 0.17355,
            VehicleClass::LargeCar => 0.21424,
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleClass::SmallCar => write!(f, "Small Car"),
            VehicleClass::MediumCar => write!(f, "Medium Car"),
            VehicleClass::LargeCar => write!(f, "Large Car"),
        }
    }
}

/// CO2e estimate for one vehicle class over a derived trip distance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmissionEstimate {
    /// Vehicle class the estimate applies to.
    pub vehicle: VehicleClass,
    /// Trip distance the estimate assumes, km.
    pub distance_km: f64,
    /// Estimated emissions in kg CO2e.
    pub co2e_kg: f64,
    /// When the estimate was produced.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: time::OffsetDateTime,
}

/// One point of the synthetic hourly forecast.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ForecastPoint {
    /// Forecast hour.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: time::OffsetDateTime,
    /// Forecast AQI value, clamped to [0, 500].
    pub value: u16,
    /// Lower confidence bound (value × 0.9).
    pub lower: u16,
    /// Upper confidence bound (value × 1.1).
    pub upper: u16,
    /// Severity category for the forecast value.
    pub category: AqiCategory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn test_dominant_pollutant() {
        let p = Pollutants {
            pm25: 80.0,
            pm10: 120.0,
            no2: 30.0,
            o3: 15.0,
            co: 1.2,
        };
        assert_eq!(p.dominant(), PollutantCode::Pm10);
    }

    #[test]
    fn test_dominant_pollutant_ignores_nan() {
        let p = Pollutants {
            pm25: 40.0,
            pm10: f32::NAN,
            no2: 10.0,
            o3: 5.0,
            co: 0.5,
        };
        assert_eq!(p.dominant(), PollutantCode::Pm25);
    }

    #[test]
    fn test_settings_defaults() {
        let s = Settings::default();
        assert_eq!(s.notification_threshold, 150);
        assert_eq!(s.refresh_interval_ms, 300_000);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let over = Settings {
            notification_threshold: 501,
            ..Settings::default()
        };
        assert!(over.validate().is_err());

        let bad_interval = Settings {
            refresh_interval_ms: 12_345,
            ..Settings::default()
        };
        assert!(bad_interval.validate().is_err());

        let edge = Settings {
            notification_threshold: 500,
            refresh_interval_ms: 60_000,
        };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_congestion_levels() {
        assert_eq!(CongestionLevel::from_speeds(45.0, 50.0), CongestionLevel::Low);
        assert_eq!(CongestionLevel::from_speeds(25.0, 50.0), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_speeds(10.0, 50.0), CongestionLevel::High);
        // Exactly 70% and 40% are not "greater than"
        assert_eq!(CongestionLevel::from_speeds(35.0, 50.0), CongestionLevel::Medium);
        assert_eq!(CongestionLevel::from_speeds(20.0, 50.0), CongestionLevel::High);
        assert_eq!(CongestionLevel::from_speeds(30.0, 0.0), CongestionLevel::High);
    }

    #[test]
    fn test_emission_factors() {
        assert!((VehicleClass::SmallCar.emission_factor() - 0.14231).abs() < 1e-9);
        assert!((VehicleClass::MediumCar.emission_factor() - 0.17355).abs() < 1e-9);
        assert!((VehicleClass::LargeCar.emission_factor() - 0.21424).abs() < 1e-9);
    }

    #[test]
    fn test_sample_category() {
        let sample = AirQualitySample {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            aqi: 180,
            pollutants: Pollutants::default(),
        };
        assert_eq!(sample.category(), AqiCategory::Moderate);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_sample_serialization_roundtrip() {
        let sample = AirQualitySample {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            aqi: 95,
            pollutants: Pollutants {
                pm25: 42.0,
                pm10: 80.0,
                no2: 21.0,
                o3: 10.0,
                co: 0.8,
            },
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert!(json.contains("\"aqi\":95"));
        let back: AirQualitySample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_congestion_serialization() {
        assert_eq!(
            serde_json::to_string(&CongestionLevel::High).unwrap(),
            "\"high\""
        );
    }
}
