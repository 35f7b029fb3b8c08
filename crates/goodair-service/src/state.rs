//! Application state shared across handlers.
//!
//! # Broadcast Channel Behavior
//!
//! The `samples_tx` broadcast channel carries each freshly collected sample
//! to in-process subscribers (the collector's notification check, tests,
//! embedders). If a subscriber falls behind and the buffer fills, old
//! messages are dropped without blocking the sender. The buffer size is
//! `server.broadcast_buffer` (default 100).

use std::sync::Arc;

use goodair_core::{ApiClient, ApiConfig, InitCell, LocationResolver};
use goodair_store::Store;
use goodair_types::{AirQualitySample, AqiCategory, Location};
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::info;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration (RwLock for runtime updates).
    pub config: RwLock<Config>,
    /// Shared HTTP client for the upstream fetchers.
    pub client: ApiClient,
    /// Keys and endpoints, resolved once at startup.
    pub api: ApiConfig,
    /// The resolved location, initialized once on first use.
    location: InitCell<Location>,
    /// Broadcast channel for freshly collected samples.
    pub samples_tx: broadcast::Sender<SampleEvent>,
}

impl AppState {
    /// Create new application state.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(store: Store, config: Config) -> goodair_core::Result<Arc<Self>> {
        let api = config.api_config();
        let (samples_tx, _) = broadcast::channel(config.server.broadcast_buffer);
        Ok(Arc::new(Self {
            store: Mutex::new(store),
            config: RwLock::new(config),
            client: ApiClient::new()?,
            api,
            location: InitCell::new(),
            samples_tx,
        }))
    }

    /// The location the service reports for.
    ///
    /// A fixed location from the config wins; otherwise the resolver runs
    /// its fallback chain. Either way the result is computed once and
    /// shared, and concurrent callers await the same resolution.
    pub async fn location(&self) -> Location {
        let guard = self
            .location
            .acquire(|| async {
                let fixed = {
                    let config = self.config.read().await;
                    config.location.fixed_location()
                };
                if let Some(location) = fixed {
                    info!("Using fixed location {}", location.city_label());
                    return Ok(location);
                }

                let resolver =
                    LocationResolver::new(self.client.clone(), self.api.clone());
                let location = resolver.resolve().await;
                info!(
                    "Resolved location {} ({}, {}) via {}",
                    location.city_label(),
                    location.latitude,
                    location.longitude,
                    location.source
                );
                Ok(location)
            })
            .await;

        match guard {
            Ok(guard) => guard.clone(),
            // The initializer above is infallible; this arm is unreachable
            // but keeps the signature honest.
            Err(_) => Location::default_fallback(),
        }
    }
}

/// A freshly collected sample, broadcast to in-process subscribers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SampleEvent {
    /// The sample that was just stored.
    pub sample: AirQualitySample,
    /// Its severity category.
    pub category: AqiCategory,
    /// Whether it crossed the configured notification threshold.
    pub above_threshold: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use goodair_types::Pollutants;

    fn test_state() -> Arc<AppState> {
        let store = Store::open_in_memory().unwrap();
        AppState::new(store, Config::default()).unwrap()
    }

    fn test_sample(aqi: u16) -> AirQualitySample {
        AirQualitySample {
            timestamp: time::OffsetDateTime::now_utc(),
            aqi,
            pollutants: Pollutants::default(),
        }
    }

    #[tokio::test]
    async fn test_app_state_new() {
        let state = test_state();
        let config = state.config.read().await;
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_fixed_location_skips_resolver() {
        let store = Store::open_in_memory().unwrap();
        let mut config = Config::default();
        config.location.latitude = Some(19.076);
        config.location.longitude = Some(72.8777);
        config.location.city = Some("Mumbai".to_string());
        let state = AppState::new(store, config).unwrap();

        let location = state.location().await;
        assert_eq!(location.city_label(), "Mumbai");

        // Second call returns the cached value
        let again = state.location().await;
        assert_eq!(again, location);
    }

    #[tokio::test]
    async fn test_broadcast_channel() {
        let state = test_state();
        let mut rx = state.samples_tx.subscribe();

        let event = SampleEvent {
            sample: test_sample(180),
            category: AqiCategory::Moderate,
            above_threshold: true,
        };
        state.samples_tx.send(event).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.sample.aqi, 180);
        assert!(received.above_threshold);
    }

    #[test]
    fn test_sample_event_serialization() {
        let event = SampleEvent {
            sample: test_sample(95),
            category: AqiCategory::Satisfactory,
            above_threshold: false,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"aqi\":95"));
        assert!(json.contains("Satisfactory"));
    }
}
