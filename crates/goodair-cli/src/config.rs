//! Configuration file management.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use goodair_core::ApiConfig;
use goodair_types::{Location, LocationSource};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fixed latitude (skips the location fallback chain)
    #[serde(default)]
    pub latitude: Option<f64>,

    /// Fixed longitude (skips the location fallback chain)
    #[serde(default)]
    pub longitude: Option<f64>,

    /// City name for the fixed location
    #[serde(default)]
    pub city: Option<String>,

    /// Country name for the fixed location
    #[serde(default)]
    pub country: Option<String>,

    /// City filter for the open-data station feed
    #[serde(default)]
    pub city_filter: Option<String>,

    /// Database path (defaults to the shared window)
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// API key for the air quality upstream
    #[serde(default)]
    pub air_quality_key: Option<String>,

    /// API key for the open-data station feed
    #[serde(default)]
    pub open_data_key: Option<String>,

    /// API key for the traffic upstream
    #[serde(default)]
    pub traffic_key: Option<String>,

    /// API key for the weather upstream
    #[serde(default)]
    pub weather_key: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("goodair")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// The fixed location, when both coordinates are configured.
    pub fn fixed_location(&self) -> Option<Location> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        let mut location = Location::try_new(lat, lon, LocationSource::Default).ok()?;
        location.city = self.city.clone();
        location.country = self.country.clone();
        Some(location)
    }

    /// Upstream keys and endpoints. Environment variables win over the
    /// config file so keys can stay out of it.
    pub fn api_config(&self) -> ApiConfig {
        let mut api = ApiConfig::default();
        api.air_quality_key = std::env::var("GOODAIR_AIR_QUALITY_KEY")
            .ok()
            .or_else(|| self.air_quality_key.clone());
        api.open_data_key = std::env::var("GOODAIR_OPEN_DATA_KEY")
            .ok()
            .or_else(|| self.open_data_key.clone());
        api.traffic_key = std::env::var("GOODAIR_TRAFFIC_KEY")
            .ok()
            .or_else(|| self.traffic_key.clone());
        api.weather_key = std::env::var("GOODAIR_WEATHER_KEY")
            .ok()
            .or_else(|| self.weather_key.clone());
        api
    }

    /// The database path: config value or the shared default window.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(goodair_store::default_db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_location_requires_both_coordinates() {
        let config = Config {
            latitude: Some(28.6139),
            ..Default::default()
        };
        assert!(config.fixed_location().is_none());
    }

    #[test]
    fn test_fixed_location_carries_place_names() {
        let config = Config {
            latitude: Some(28.6139),
            longitude: Some(77.2090),
            city: Some("New Delhi".to_string()),
            ..Default::default()
        };
        let location = config.fixed_location().unwrap();
        assert_eq!(location.city_label(), "New Delhi");
    }

    #[test]
    fn test_fixed_location_rejects_bad_coordinates() {
        let config = Config {
            latitude: Some(91.0),
            longitude: Some(0.0),
            ..Default::default()
        };
        assert!(config.fixed_location().is_none());
    }

    #[test]
    fn test_database_path_defaults() {
        let config = Config::default();
        assert!(config.database_path().ends_with("goodair/data.db"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            city_filter: Some("Delhi".to_string()),
            ..Default::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.city_filter.as_deref(), Some("Delhi"));
    }
}
