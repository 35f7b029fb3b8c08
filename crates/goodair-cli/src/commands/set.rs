//! Set command implementation.

use anyhow::{Result, bail};

use crate::config::Config;
use crate::util::open_store;

pub fn cmd_set(
    config: &Config,
    threshold: Option<u16>,
    interval: Option<u64>,
    quiet: bool,
) -> Result<()> {
    if threshold.is_none() && interval.is_none() {
        bail!("Nothing to set. Use --threshold and/or --interval");
    }

    let store = open_store(config)?;
    let mut settings = store.settings()?;

    if let Some(threshold) = threshold {
        settings.notification_threshold = threshold;
    }
    if let Some(interval) = interval {
        settings.refresh_interval_ms = interval;
    }

    store.update_settings(&settings)?;

    if !quiet {
        println!(
            "Notification threshold: {}\nRefresh interval: {} ms",
            settings.notification_threshold, settings.refresh_interval_ms
        );
    }
    Ok(())
}
