//! Resolved geographic locations.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// How a location was resolved.
///
/// The resolver tries sources in order of accuracy: a device position fix,
/// then IP-based geolocation, then the fixed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum LocationSource {
    /// Position reported by the device/platform.
    Device,
    /// Approximate position derived from the public IP address.
    Ip,
    /// The hardcoded fallback location.
    Default,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSource::Device => write!(f, "device"),
            LocationSource::Ip => write!(f, "ip"),
            LocationSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved geographic location.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Latitude in degrees, [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180].
    pub longitude: f64,
    /// City name, if known.
    pub city: Option<String>,
    /// Country name, if known.
    pub country: Option<String>,
    /// How this location was resolved.
    pub source: LocationSource,
}

impl Location {
    /// Create a location after validating coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidValue`] if either coordinate is
    /// non-finite or out of range.
    pub fn try_new(latitude: f64, longitude: f64, source: LocationSource) -> Result<Self, ParseError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ParseError::InvalidValue(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ParseError::InvalidValue(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
            city: None,
            country: None,
            source,
        })
    }

    /// Attach city and country labels.
    #[must_use]
    pub fn with_place(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self.country = Some(country.into());
        self
    }

    /// The fixed fallback location used when every resolution tier fails.
    #[must_use]
    pub fn default_fallback() -> Self {
        Self {
            latitude: 28.6139,
            longitude: 77.2090,
            city: Some("New Delhi".to_string()),
            country: Some("India".to_string()),
            source: LocationSource::Default,
        }
    }

    /// City label, substituting "Unknown City" when absent.
    #[must_use]
    pub fn city_label(&self) -> &str {
        self.city.as_deref().unwrap_or("Unknown City")
    }

    /// Country label, substituting "Unknown Country" when absent.
    #[must_use]
    pub fn country_label(&self) -> &str {
        self.country.as_deref().unwrap_or("Unknown Country")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_valid() {
        let loc = Location::try_new(28.6139, 77.2090, LocationSource::Device).unwrap();
        assert_eq!(loc.source, LocationSource::Device);
        assert!(loc.city.is_none());
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(Location::try_new(91.0, 0.0, LocationSource::Ip).is_err());
        assert!(Location::try_new(-91.0, 0.0, LocationSource::Ip).is_err());
        assert!(Location::try_new(0.0, 181.0, LocationSource::Ip).is_err());
        assert!(Location::try_new(0.0, -181.0, LocationSource::Ip).is_err());
        assert!(Location::try_new(f64::NAN, 0.0, LocationSource::Ip).is_err());
    }

    #[test]
    fn test_default_fallback() {
        let loc = Location::default_fallback();
        assert!((loc.latitude - 28.6139).abs() < 1e-9);
        assert!((loc.longitude - 77.2090).abs() < 1e-9);
        assert_eq!(loc.city_label(), "New Delhi");
        assert_eq!(loc.source, LocationSource::Default);
    }

    #[test]
    fn test_unknown_labels() {
        let loc = Location::try_new(10.0, 10.0, LocationSource::Device).unwrap();
        assert_eq!(loc.city_label(), "Unknown City");
        assert_eq!(loc.country_label(), "Unknown Country");
    }
}
