//! Synthetic AQI forecast.
//!
//! This is presentation data, not a predictive model: a diurnal sine wave
//! around the latest known AQI with a little noise, exactly what the
//! dashboard's forecast chart expects.

use goodair_types::{AqiCategory, ForecastPoint, MAX_AQI};
use rand::Rng;
use time::{Duration, OffsetDateTime};

/// Default forecast horizon: four days of hourly points.
pub const DEFAULT_HOURS: usize = 96;

/// Amplitude of the diurnal cycle, AQI points.
const DIURNAL_AMPLITUDE: f64 = 10.0;

/// Half-width of the uniform noise band, AQI points.
const NOISE_HALF_WIDTH: f64 = 2.5;

/// Generate `hours` hourly forecast points starting at `start`.
///
/// Each value is `base + sin(i * π/12) * 10` plus uniform noise in
/// [-2.5, 2.5), clamped to [0, 500]. The confidence band is value ±10%.
/// Deterministic for a seeded rng.
pub fn synthetic<R: Rng + ?Sized>(
    base_aqi: u16,
    hours: usize,
    start: OffsetDateTime,
    rng: &mut R,
) -> Vec<ForecastPoint> {
    let base = f64::from(base_aqi);
    (0..hours)
        .map(|i| {
            let cycle = (i as f64 * std::f64::consts::PI / 12.0).sin() * DIURNAL_AMPLITUDE;
            let noise = rng.random::<f64>() * (2.0 * NOISE_HALF_WIDTH) - NOISE_HALF_WIDTH;
            let value = (base + cycle + noise).clamp(0.0, f64::from(MAX_AQI));
            let value = value.round() as u16;

            ForecastPoint {
                timestamp: start + Duration::hours(i as i64),
                value,
                lower: (f64::from(value) * 0.9).round() as u16,
                upper: ((f64::from(value) * 1.1).round() as u16).min(MAX_AQI),
                category: AqiCategory::from_aqi(value),
            }
        })
        .collect()
}
