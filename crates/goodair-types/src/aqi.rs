//! AQI categorization on the Indian National AQI (NAQI) scale.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum AQI value on the NAQI scale.
pub const MAX_AQI: u16 = 500;

/// NAQI severity category.
///
/// The six buckets follow the CPCB table: 0-50 Good, 51-100 Satisfactory,
/// 101-200 Moderate, 201-300 Poor, 301-400 Very Poor, above 400 Severe.
///
/// # Ordering
///
/// Categories are ordered by severity: `Good < Satisfactory < ... < Severe`.
/// This allows threshold comparisons like `if category >= AqiCategory::Poor { warn!(...) }`.
///
/// ```
/// use goodair_types::AqiCategory;
///
/// assert_eq!(AqiCategory::from_aqi(50), AqiCategory::Good);
/// assert_eq!(AqiCategory::from_aqi(51), AqiCategory::Satisfactory);
/// assert!(AqiCategory::Severe > AqiCategory::Poor);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[repr(u8)]
pub enum AqiCategory {
    /// Minimal impact (0-50).
    Good = 0,
    /// Minor breathing discomfort to sensitive people (51-100).
    Satisfactory = 1,
    /// Breathing discomfort to people with lung disease (101-200).
    Moderate = 2,
    /// Breathing discomfort on prolonged exposure (201-300).
    Poor = 3,
    /// Respiratory illness on prolonged exposure (301-400).
    VeryPoor = 4,
    /// Affects healthy people, serious impact on those with existing disease (>400).
    Severe = 5,
}

impl AqiCategory {
    /// Categorize a numeric AQI value.
    #[must_use]
    pub fn from_aqi(aqi: u16) -> Self {
        if aqi <= 50 {
            AqiCategory::Good
        } else if aqi <= 100 {
            AqiCategory::Satisfactory
        } else if aqi <= 200 {
            AqiCategory::Moderate
        } else if aqi <= 300 {
            AqiCategory::Poor
        } else if aqi <= 400 {
            AqiCategory::VeryPoor
        } else {
            AqiCategory::Severe
        }
    }

    /// Display color for this category as a hex string.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#009933",
            AqiCategory::Satisfactory => "#58ff09",
            AqiCategory::Moderate => "#ffff00",
            AqiCategory::Poor => "#ffa500",
            AqiCategory::VeryPoor => "#ff0000",
            AqiCategory::Severe => "#990000",
        }
    }

    /// Short health guidance for this category.
    #[must_use]
    pub fn advisory(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Air quality is good, enjoy outdoor activities",
            AqiCategory::Satisfactory => "Sensitive people may experience minor discomfort",
            AqiCategory::Moderate => "Consider limiting prolonged outdoor exertion",
            AqiCategory::Poor => "Avoid prolonged outdoor exertion",
            AqiCategory::VeryPoor => "Avoid outdoor activity where possible",
            AqiCategory::Severe => "Stay indoors and keep activity levels low",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiCategory::Good => write!(f, "Good"),
            AqiCategory::Satisfactory => write!(f, "Satisfactory"),
            AqiCategory::Moderate => write!(f, "Moderate"),
            AqiCategory::Poor => write!(f, "Poor"),
            AqiCategory::VeryPoor => write!(f, "Very Poor"),
            AqiCategory::Severe => write!(f, "Severe"),
        }
    }
}
