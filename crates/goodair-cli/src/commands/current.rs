//! Current command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};

use goodair_core::{ApiClient, airquality, percent_change};
use goodair_types::AirQualitySample;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::format_current_text;
use crate::util::{open_store, resolve_location, write_output};

pub async fn cmd_current(
    config: &Config,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let client = ApiClient::new()?;
    let api = config.api_config();
    let location = resolve_location(&client, config).await;

    let conditions =
        airquality::fetch_current(&client, &api, location.latitude, location.longitude)
            .await
            .context("Failed to fetch current conditions")?;

    let change = record_and_change(config, &conditions.sample);

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&conditions)? + "\n",
        OutputFormat::Text => format_current_text(&conditions, &location, change),
    };

    write_output(output, &content)
}

/// Append the fresh sample to the local window and compute the percent
/// change against the previous reading. Best effort: a broken database
/// should not hide the reading, so every failure degrades with a warning
/// and the trend line is omitted.
fn record_and_change(config: &Config, sample: &AirQualitySample) -> Option<f64> {
    let mut store = match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("Could not open store: {}", e);
            return None;
        }
    };

    let previous = match store.latest_sample() {
        Ok(previous) => previous.map(|s| s.aqi),
        Err(e) => {
            tracing::warn!("Could not read previous sample: {}", e);
            None
        }
    };

    if let Err(e) = store.insert_sample(sample) {
        tracing::warn!("Could not store sample: {}", e);
    }

    Some(percent_change(previous, sample.aqi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use goodair_types::Pollutants;
    use time::OffsetDateTime;

    fn sample(aqi: u16) -> AirQualitySample {
        AirQualitySample {
            timestamp: OffsetDateTime::now_utc(),
            aqi,
            pollutants: Pollutants::default(),
        }
    }

    #[test]
    fn test_record_and_change_tracks_previous_reading() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database: Some(dir.path().join("data.db")),
            ..Default::default()
        };

        // First reading has no previous sample to compare against
        assert_eq!(record_and_change(&config, &sample(100)), Some(0.0));
        // Second reading compares against the first
        assert_eq!(record_and_change(&config, &sample(150)), Some(50.0));
    }

    #[test]
    fn test_record_and_change_degrades_without_store() {
        // A regular file where a directory is needed makes open fail
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config {
            database: Some(file.path().join("nested").join("data.db")),
            ..Default::default()
        };

        assert_eq!(record_and_change(&config, &sample(100)), None);
    }
}
