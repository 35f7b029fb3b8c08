//! Service configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use goodair_core::ApiConfig;
use goodair_types::REFRESH_INTERVALS_MS;

/// Service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Fixed location (skips the resolver when set).
    pub location: LocationConfig,
    /// Upstream API keys and endpoint overrides.
    pub api: ApiKeysConfig,
    /// Collector settings.
    pub collector: CollectorConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Server bind address is valid (host:port format)
    /// - Storage path is not empty
    /// - Fixed coordinates, when set, are paired and in range
    /// - The collector fallback interval is one of the supported values
    ///
    /// # Example
    ///
    /// ```
    /// use goodair_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.location.validate());
        errors.extend(self.collector.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    ///
    /// This is a convenience method that combines `load()` and `validate()`.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the core [`ApiConfig`], applying `GOODAIR_*` environment
    /// overrides for keys not present in the file.
    pub fn api_config(&self) -> ApiConfig {
        let mut api = ApiConfig::default();
        api.air_quality_key = self
            .api
            .air_quality_key
            .clone()
            .or_else(|| std::env::var("GOODAIR_AIR_QUALITY_KEY").ok());
        api.open_data_key = self
            .api
            .open_data_key
            .clone()
            .or_else(|| std::env::var("GOODAIR_OPEN_DATA_KEY").ok());
        api.traffic_key = self
            .api
            .traffic_key
            .clone()
            .or_else(|| std::env::var("GOODAIR_TRAFFIC_KEY").ok());
        api.weather_key = self
            .api
            .weather_key
            .clone()
            .or_else(|| std::env::var("GOODAIR_WEATHER_KEY").ok());
        if let Some(url) = &self.api.open_data_url {
            api.open_data_url = url.clone();
        }
        api
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind: String,
    /// Broadcast channel buffer for sample events.
    pub broadcast_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            broadcast_buffer: 100,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError {
                field: "server.bind".to_string(),
                message: "bind address cannot be empty".to_string(),
            });
        } else {
            // Check for valid host:port format
            let parts: Vec<&str> = self.bind.rsplitn(2, ':').collect();
            if parts.len() != 2 {
                errors.push(ValidationError {
                    field: "server.bind".to_string(),
                    message: format!(
                        "invalid bind address '{}': expected format 'host:port'",
                        self.bind
                    ),
                });
            } else {
                // Validate port
                let port_str = parts[0];
                match port_str.parse::<u16>() {
                    Ok(0) => {
                        errors.push(ValidationError {
                            field: "server.bind".to_string(),
                            message: "port cannot be 0".to_string(),
                        });
                    }
                    Err(_) => {
                        errors.push(ValidationError {
                            field: "server.bind".to_string(),
                            message: format!(
                                "invalid port '{}': must be a number 1-65535",
                                port_str
                            ),
                        });
                    }
                    Ok(_) => {} // Valid port
                }
            }
        }

        if self.broadcast_buffer == 0 {
            errors.push(ValidationError {
                field: "server.broadcast_buffer".to_string(),
                message: "broadcast buffer cannot be 0".to_string(),
            });
        }

        errors
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: goodair_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "database path cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Fixed location configuration.
///
/// When both coordinates are set the resolver is skipped entirely and the
/// service reports for this point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Fixed latitude.
    pub latitude: Option<f64>,
    /// Fixed longitude.
    pub longitude: Option<f64>,
    /// Label for the fixed location.
    pub city: Option<String>,
    /// Label for the fixed location.
    pub country: Option<String>,
}

impl LocationConfig {
    /// Validate location configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    errors.push(ValidationError {
                        field: "location.latitude".to_string(),
                        message: format!("latitude {} is outside [-90, 90]", lat),
                    });
                }
                if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                    errors.push(ValidationError {
                        field: "location.longitude".to_string(),
                        message: format!("longitude {} is outside [-180, 180]", lon),
                    });
                }
            }
            (None, None) => {}
            _ => {
                errors.push(ValidationError {
                    field: "location".to_string(),
                    message: "latitude and longitude must be set together".to_string(),
                });
            }
        }

        errors
    }

    /// The fixed location, when fully configured.
    pub fn fixed_location(&self) -> Option<goodair_types::Location> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        let mut location =
            goodair_types::Location::try_new(lat, lon, goodair_types::LocationSource::Default)
                .ok()?;
        location.city = self.city.clone();
        location.country = self.country.clone();
        Some(location)
    }
}

/// Upstream API keys and endpoint overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeysConfig {
    /// Key for the commercial air-quality API.
    pub air_quality_key: Option<String>,
    /// Key for the data.gov.in open-data resource.
    pub open_data_key: Option<String>,
    /// Key for the TomTom traffic APIs.
    pub traffic_key: Option<String>,
    /// Key for OpenWeatherMap.
    pub weather_key: Option<String>,
    /// Open-data resource URL override.
    pub open_data_url: Option<String>,
    /// City filter for the open-data proxy.
    pub city_filter: Option<String>,
}

/// Collector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Whether the background collector runs.
    pub enabled: bool,
    /// Refresh interval used until settings are readable, milliseconds.
    pub fallback_interval_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback_interval_ms: goodair_types::DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl CollectorConfig {
    /// Validate collector configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !REFRESH_INTERVALS_MS.contains(&self.fallback_interval_ms) {
            errors.push(ValidationError {
                field: "collector.fallback_interval_ms".to_string(),
                message: format!(
                    "{} ms is not one of the supported refresh intervals",
                    self.fallback_interval_ms
                ),
            });
        }

        errors
    }
}

/// A single validation failure, scoped to a config field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the config file.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to write the config file.
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize the config.
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    /// One or more fields failed validation.
    #[error("Invalid configuration: {}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goodair")
        .join("service.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert!(config.collector.enabled);
    }

    #[test]
    fn test_bind_validation() {
        let mut config = Config::default();

        config.server.bind = "nonsense".to_string();
        assert!(config.validate().is_err());

        config.server.bind = "127.0.0.1:0".to_string();
        assert!(config.validate().is_err());

        config.server.bind = "0.0.0.0:9090".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_location_must_be_paired() {
        let mut config = Config::default();
        config.location.latitude = Some(28.6);
        assert!(config.validate().is_err());

        config.location.longitude = Some(77.2);
        assert!(config.validate().is_ok());

        config.location.latitude = Some(120.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fixed_location() {
        let location = LocationConfig {
            latitude: Some(19.076),
            longitude: Some(72.8777),
            city: Some("Mumbai".to_string()),
            country: None,
        };
        let fixed = location.fixed_location().unwrap();
        assert_eq!(fixed.city_label(), "Mumbai");
        assert_eq!(fixed.country_label(), "Unknown Country");

        assert!(LocationConfig::default().fixed_location().is_none());
    }

    #[test]
    fn test_collector_interval_validation() {
        let mut config = Config::default();
        config.collector.fallback_interval_ms = 12345;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fallback_interval_ms"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml_text = r#"
            [server]
            bind = "0.0.0.0:3000"

            [api]
            traffic_key = "tt-key"
            city_filter = "Delhi"

            [collector]
            enabled = false
        "#;
        let config: Config = toml::from_str(toml_text).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.api.traffic_key.as_deref(), Some("tt-key"));
        assert!(!config.collector.enabled);
        // Defaults fill the rest
        assert_eq!(config.server.broadcast_buffer, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("service.toml");

        let mut config = Config::default();
        config.api.city_filter = Some("Delhi".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load_validated(&path).unwrap();
        assert_eq!(loaded.api.city_filter.as_deref(), Some("Delhi"));
    }
}
