//! Forecast command implementation.

use std::path::PathBuf;

use anyhow::{Result, bail};
use time::OffsetDateTime;

use goodair_core::forecast;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_forecast_text;
use crate::util::{open_store, write_output};

/// Base AQI assumed when the window is empty.
const DEFAULT_BASE: u16 = 50;

/// Longest horizon the command will render.
const MAX_HOURS: usize = 168;

pub fn cmd_forecast(
    config: &Config,
    hours: usize,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    if hours == 0 || hours > MAX_HOURS {
        bail!("hours must be between 1 and {}", MAX_HOURS);
    }

    let base = forecast_base(config);
    let points = forecast::synthetic(base, hours, OffsetDateTime::now_utc(), &mut rand::rng());

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&points)? + "\n",
        OutputFormat::Text => format_forecast_text(&points),
    };

    write_output(output, &content)
}

/// Anchor the forecast at the latest stored AQI. A missing or unreadable
/// window degrades to the default base, with a warning.
fn forecast_base(config: &Config) -> u16 {
    match open_store(config) {
        Ok(store) => match store.latest_sample() {
            Ok(latest) => latest.map_or(DEFAULT_BASE, |s| s.aqi),
            Err(e) => {
                tracing::warn!("Could not read latest sample: {}", e);
                DEFAULT_BASE
            }
        },
        Err(e) => {
            tracing::warn!("Could not open store: {}", e);
            DEFAULT_BASE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goodair_types::{AirQualitySample, Pollutants};

    #[test]
    fn test_forecast_base_uses_latest_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        let config = Config {
            database: Some(path.clone()),
            ..Default::default()
        };

        // Empty window anchors at the default
        assert_eq!(forecast_base(&config), DEFAULT_BASE);

        let mut store = goodair_store::Store::open(&path).unwrap();
        store
            .insert_sample(&AirQualitySample {
                timestamp: OffsetDateTime::now_utc(),
                aqi: 180,
                pollutants: Pollutants::default(),
            })
            .unwrap();
        drop(store);

        assert_eq!(forecast_base(&config), 180);
    }

    #[test]
    fn test_forecast_base_degrades_without_store() {
        // A regular file where a directory is needed makes open fail
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config {
            database: Some(file.path().join("nested").join("data.db")),
            ..Default::default()
        };

        assert_eq!(forecast_base(&config), DEFAULT_BASE);
    }
}
