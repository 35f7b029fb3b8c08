//! Background sample collector.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use goodair_core::airquality;
use goodair_types::{AirQualitySample, AqiCategory, DEFAULT_REFRESH_INTERVAL_MS};

use crate::state::{AppState, SampleEvent};

/// Background collector that appends a sample every refresh interval.
pub struct Collector {
    state: Arc<AppState>,
}

impl Collector {
    /// Create a new collector.
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Start the collection loop in the background. Returns immediately.
    pub fn start(&self) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            collect_loop(state).await;
        });
    }
}

/// The collection loop: resolve location once, then fetch and store a
/// sample every refresh interval. Fetch failures never end the loop.
async fn collect_loop(state: Arc<AppState>) {
    let location = state.location().await;
    info!(
        "Collector starting for {} ({}, {})",
        location.city_label(),
        location.latitude,
        location.longitude
    );

    let mut consecutive_failures = 0u32;

    loop {
        // The interval lives in settings so a PUT takes effect on the
        // next tick without a restart.
        let interval_ms = current_interval_ms(&state).await;

        match collect_once(&state, location.latitude, location.longitude).await {
            Ok(sample) => {
                consecutive_failures = 0;
                debug!("Collected sample: AQI {}", sample.aqi);
            }
            Err(e) => {
                consecutive_failures += 1;
                if consecutive_failures <= 3 {
                    warn!(
                        "Failed to collect sample: {} (attempt {})",
                        e, consecutive_failures
                    );
                } else if consecutive_failures == 4 {
                    error!(
                        "Failed to collect sample after {} attempts, will continue trying silently",
                        consecutive_failures
                    );
                }
                // Keep going - the upstream may come back
            }
        }

        sleep(Duration::from_millis(interval_ms)).await;
    }
}

/// The refresh interval from stored settings, with a config fallback when
/// the store is unreadable.
async fn current_interval_ms(state: &AppState) -> u64 {
    let stored = {
        let store = state.store.lock().await;
        store.settings()
    };
    match stored {
        Ok(settings) => settings.refresh_interval_ms,
        Err(e) => {
            let mut fallback = {
                let config = state.config.read().await;
                config.collector.fallback_interval_ms
            };
            if fallback == 0 {
                fallback = DEFAULT_REFRESH_INTERVAL_MS;
            }
            warn!(
                "Could not read settings ({}), using fallback interval {}ms",
                e, fallback
            );
            fallback
        }
    }
}

/// Fetch one reading, store it, and broadcast the event.
async fn collect_once(
    state: &AppState,
    latitude: f64,
    longitude: f64,
) -> Result<AirQualitySample, CollectorError> {
    let conditions = airquality::fetch_current(&state.client, &state.api, latitude, longitude)
        .await
        .map_err(CollectorError::Fetch)?;

    let threshold = {
        let mut store = state.store.lock().await;
        store
            .insert_sample(&conditions.sample)
            .map_err(CollectorError::Store)?;
        store
            .settings()
            .map_err(CollectorError::Store)?
            .notification_threshold
    };

    let above_threshold = conditions.sample.aqi >= threshold;
    if above_threshold {
        warn!(
            "AQI {} is at or above the notification threshold {}",
            conditions.sample.aqi, threshold
        );
    }

    let _ = state.samples_tx.send(SampleEvent {
        sample: conditions.sample.clone(),
        category: AqiCategory::from_aqi(conditions.sample.aqi),
        above_threshold,
    });

    Ok(conditions.sample)
}

/// Collector errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to fetch: {0}")]
    Fetch(goodair_core::Error),
    #[error("Failed to store: {0}")]
    Store(goodair_store::Error),
}
