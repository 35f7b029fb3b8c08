//! Watch command implementation.

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;

use goodair_core::{ApiClient, airquality};
use goodair_types::DEFAULT_NOTIFICATION_THRESHOLD;

use crate::config::Config;
use crate::format::format_watch_line;
use crate::util::{open_store, resolve_location};

pub async fn cmd_watch(config: &Config, interval: u64, count: u32, quiet: bool) -> Result<()> {
    let client = ApiClient::new()?;
    let api = config.api_config();
    let location = resolve_location(&client, config).await;
    let mut store = open_store(config)?;

    if !quiet {
        eprintln!(
            "Watching {} every {}s (Ctrl+C to stop)",
            location.city_label(),
            interval
        );
    }

    let mut readings = 0u32;

    loop {
        match airquality::fetch_current(&client, &api, location.latitude, location.longitude).await
        {
            Ok(conditions) => {
                if let Err(e) = store.insert_sample(&conditions.sample) {
                    tracing::warn!("Could not store sample: {}", e);
                }
                println!("{}", format_watch_line(&conditions));

                // Re-read per tick so a concurrent `set` takes effect
                let threshold = match store.settings() {
                    Ok(settings) => settings.notification_threshold,
                    Err(e) => {
                        tracing::warn!("Could not read settings: {}", e);
                        DEFAULT_NOTIFICATION_THRESHOLD
                    }
                };
                if conditions.sample.aqi >= threshold && !quiet {
                    eprintln!(
                        "  AQI {} is at or above your threshold of {}",
                        conditions.sample.aqi, threshold
                    );
                }

                // Only successful readings count toward --count
                readings += 1;
            }
            Err(e) => eprintln!("Fetch failed: {}", e),
        }

        if reached_count(count, readings) {
            break;
        }
        sleep(Duration::from_secs(interval)).await;
    }

    Ok(())
}

/// Whether the requested number of readings has been taken. A count of
/// zero watches forever.
fn reached_count(requested: u32, readings: u32) -> bool {
    requested > 0 && readings >= requested
}
