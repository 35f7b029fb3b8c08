//! Output formatting for CLI commands.

use std::fmt::Write as _;

use owo_colors::OwoColorize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use goodair_core::airquality::CurrentConditions;
use goodair_core::{RoutesSummary, TrafficSummary};
use goodair_types::{
    AirQualitySample, AqiCategory, EmissionEstimate, ForecastPoint, Location, WeatherObservation,
};

/// Render a category in its dashboard color.
pub fn category_colored(category: AqiCategory) -> String {
    let (r, g, b) = category_rgb(category);
    format!("{}", category.truecolor(r, g, b))
}

/// The dashboard hex palette as RGB triples.
fn category_rgb(category: AqiCategory) -> (u8, u8, u8) {
    match category {
        AqiCategory::Good => (0x00, 0x99, 0x33),
        AqiCategory::Satisfactory => (0x58, 0xff, 0x09),
        AqiCategory::Moderate => (0xff, 0xff, 0x00),
        AqiCategory::Poor => (0xff, 0xa5, 0x00),
        AqiCategory::VeryPoor => (0xff, 0x00, 0x00),
        _ => (0x99, 0x00, 0x00),
    }
}

fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

/// Full current-conditions card.
pub fn format_current_text(
    conditions: &CurrentConditions,
    location: &Location,
    change_percent: Option<f64>,
) -> String {
    let mut out = String::new();
    let category = conditions.category;

    let _ = writeln!(
        out,
        "{} ({}, {})",
        location.city_label().bold(),
        location.latitude,
        location.longitude
    );
    let _ = writeln!(
        out,
        "AQI {}  {}",
        conditions.sample.aqi.bold(),
        category_colored(category)
    );
    if let Some(change) = change_percent {
        let _ = writeln!(out, "Change since last reading: {:+.1}%", change);
    }
    let _ = writeln!(out, "{}", category.advisory());
    if let Some(dominant) = &conditions.dominant_pollutant {
        let _ = writeln!(out, "Dominant pollutant: {}", dominant);
    }
    if !conditions.pollutants.is_empty() {
        let _ = writeln!(out);
        for p in &conditions.pollutants {
            let _ = writeln!(out, "  {:<8} {:>8.1} {}", p.display_name, p.value, p.unit);
        }
    }
    if let Some(rec) = &conditions.recommendation {
        let _ = writeln!(out, "\n{}", rec.italic());
    }
    out
}

/// One-line reading for watch mode.
pub fn format_watch_line(conditions: &CurrentConditions) -> String {
    format!(
        "{}  AQI {:>3}  {}",
        format_timestamp(conditions.sample.timestamp),
        conditions.sample.aqi,
        category_colored(conditions.category)
    )
}

/// Hourly forecast table.
pub fn format_forecast_text(points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<25} {:>6} {:>6} {:>6}  Category",
        "Time", "AQI", "Low", "High"
    );
    for p in points {
        let _ = writeln!(
            out,
            "{:<25} {:>6} {:>6} {:>6}  {}",
            format_timestamp(p.timestamp),
            p.value,
            p.lower,
            p.upper,
            category_colored(p.category)
        );
    }
    out
}

/// Traffic flow card.
pub fn format_traffic_text(summary: &TrafficSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Current speed:   {:.1} km/h",
        summary.flow.current_speed
    );
    let _ = writeln!(
        out,
        "Free-flow speed: {:.1} km/h",
        summary.flow.free_flow_speed
    );
    let _ = writeln!(out, "Confidence:      {:.2}", summary.flow.confidence);
    let _ = writeln!(out, "Density:         {}/100", summary.density.bold());
    out
}

/// Weather card.
pub fn format_weather_text(observation: &WeatherObservation) -> String {
    format!(
        "Temperature: {:.1} °C\nHumidity:    {}%\nObserved:    {}\n",
        observation.temperature,
        observation.humidity,
        format_timestamp(observation.timestamp)
    )
}

/// Routes card: one line per affected segment.
pub fn format_routes_text(summary: &RoutesSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Active incidents: {}", summary.active_incidents.bold());
    for segment in &summary.segments {
        let _ = writeln!(
            out,
            "  {:<20} {:>5.1} km/h  {:?}",
            segment.id, segment.current_speed, segment.congestion
        );
    }
    out
}

/// Emissions card: one line per vehicle class.
pub fn format_emissions_text(density: u8, estimates: &[EmissionEstimate]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Traffic density: {}/100", density);
    for e in estimates {
        let _ = writeln!(
            out,
            "  {:<12} {:>5.1} km  {:.3} kg CO2e",
            format!("{:?}", e.vehicle),
            e.distance_km,
            e.co2e_kg
        );
    }
    out
}

/// Stored samples as a table, one row per sample.
pub fn format_history_text(samples: &[AirQualitySample]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<25} {:>5}  Category", "Time", "AQI");
    for sample in samples {
        let _ = writeln!(
            out,
            "{:<25} {:>5}  {}",
            format_timestamp(sample.timestamp),
            sample.aqi,
            category_colored(sample.category())
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use goodair_types::Pollutants;

    fn sample(aqi: u16) -> AirQualitySample {
        AirQualitySample {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            aqi,
            pollutants: Pollutants::default(),
        }
    }

    #[test]
    fn test_history_table_contains_values() {
        let out = format_history_text(&[sample(42), sample(180)]);
        assert!(out.contains("42"));
        assert!(out.contains("180"));
        assert!(out.contains("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn test_watch_line_is_single_line() {
        let conditions = CurrentConditions {
            sample: sample(95),
            category: AqiCategory::Satisfactory,
            dominant_pollutant: None,
            pollutants: Vec::new(),
            recommendation: None,
        };
        let line = format_watch_line(&conditions);
        assert_eq!(line.trim_end().lines().count(), 1);
        assert!(line.contains("95"));
    }

    #[test]
    fn test_current_text_shows_advisory() {
        let conditions = CurrentConditions {
            sample: sample(420),
            category: AqiCategory::Severe,
            dominant_pollutant: Some("pm25".to_string()),
            pollutants: Vec::new(),
            recommendation: None,
        };
        let out = format_current_text(&conditions, &Location::default_fallback(), Some(12.5));
        assert!(out.contains("420"));
        assert!(out.contains(AqiCategory::Severe.advisory()));
        assert!(out.contains("pm25"));
    }
}
