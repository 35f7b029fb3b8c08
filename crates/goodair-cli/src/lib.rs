//! Command-line interface for the Good Air Day dashboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `current` | Show the current air quality reading |
//! | `forecast` | Show a synthetic hourly AQI forecast |
//! | `traffic` | Show current traffic flow and density |
//! | `weather` | Show the current weather observation |
//! | `routes` | Show active traffic incidents |
//! | `emissions` | Show per-vehicle-class CO2e estimates |
//! | `history` | Show or export stored samples |
//! | `clear` | Clear stored samples and reset settings |
//! | `set` | Update notification settings |
//! | `watch` | Continuously poll and store readings |
//!
//! # Configuration
//!
//! The CLI stores configuration in `~/.config/goodair/config.toml` (or the
//! platform equivalent). A fixed location, a database path, and upstream
//! API keys can be set there; the `GOODAIR_AIR_QUALITY_KEY`,
//! `GOODAIR_OPEN_DATA_KEY`, `GOODAIR_TRAFFIC_KEY`, and `GOODAIR_WEATHER_KEY`
//! environment variables override keys from the file.
//!
//! # Examples
//!
//! Show the current reading:
//! ```bash
//! goodair current
//! ```
//!
//! Export stored history as CSV:
//! ```bash
//! goodair history --csv --output aqi.csv
//! ```
//!
//! Poll every five minutes:
//! ```bash
//! goodair watch --interval 300
//! ```

// The command implementations live in main.rs's module tree; this crate is
// primarily a binary. Core and types are re-exported for convenience.

pub use goodair_core;
pub use goodair_types;
