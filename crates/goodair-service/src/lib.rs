//! Background collector and HTTP REST API for Good Air Day.
//!
//! This crate provides a service that:
//! - Polls the air-quality upstream on the configured refresh interval
//! - Stores samples in the local rolling window
//! - Exposes a REST API for the dashboard's cards and settings
//! - Proxies the open-data station feed so API keys stay server-side
//!
//! # REST API Endpoints
//!
//! - `GET /api/health` - Service health check
//! - `GET /api/air-quality` - Open-data station feed proxy
//! - `GET /api/current` - Latest sample with category, color, and trend
//! - `GET /api/samples` - Query the stored window (`since`, `until`, `limit`)
//! - `DELETE /api/samples` - Clear the window and reset settings
//! - `GET /api/forecast` - Synthetic hourly forecast (`hours`, default 96)
//! - `GET /api/traffic` - Current traffic flow and density
//! - `GET /api/weather` - Current weather observation
//! - `GET /api/routes` - Active traffic incidents as route segments
//! - `GET /api/emissions` - Per-vehicle-class CO2e estimates
//! - `GET /api/location` - The resolved location
//! - `GET /api/settings` / `PUT /api/settings` - Notification settings
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/goodair/service.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8080"
//!
//! [storage]
//! path = "~/.local/share/goodair/data.db"
//!
//! [location]
//! latitude = 28.6139
//! longitude = 77.2090
//! city = "New Delhi"
//!
//! [api]
//! city_filter = "Delhi"
//! ```
//!
//! API keys come from the config file or the `GOODAIR_AIR_QUALITY_KEY`,
//! `GOODAIR_OPEN_DATA_KEY`, `GOODAIR_TRAFFIC_KEY`, and `GOODAIR_WEATHER_KEY`
//! environment variables.

pub mod api;
pub mod collector;
pub mod config;
pub mod state;

pub use collector::Collector;
pub use config::{
    ApiKeysConfig, CollectorConfig, Config, ConfigError, LocationConfig, ServerConfig,
    StorageConfig,
};
pub use state::{AppState, SampleEvent};
