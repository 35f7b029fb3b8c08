//! Current-weather fetcher (OpenWeatherMap, metric units).

use goodair_types::{Location, WeatherObservation};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::client::{ApiClient, ApiConfig};
use crate::error::{Error, Result};

#[derive(Deserialize)]
struct WeatherResponse {
    main: Option<MainBlock>,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: Option<f32>,
    humidity: Option<f32>,
}

/// Fetch the current temperature and humidity for a location.
///
/// # Errors
///
/// Fails when no API key is configured, the request fails, or the
/// response is missing `main.temp`/`main.humidity`.
pub async fn fetch_current(
    client: &ApiClient,
    config: &ApiConfig,
    location: &Location,
) -> Result<WeatherObservation> {
    let key = config
        .weather_key
        .as_deref()
        .ok_or(Error::MissingApiKey("weather"))?;
    let lat = location.latitude.to_string();
    let lon = location.longitude.to_string();

    let response: WeatherResponse = client
        .get_json(
            &config.weather_url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", key),
                ("units", "metric"),
            ],
        )
        .await?;

    let main = response.main.ok_or(Error::InvalidResponse {
        service: "weather",
        message: "response has no main block".to_string(),
    })?;
    let (Some(temp), Some(humidity)) = (main.temp, main.humidity) else {
        return Err(Error::InvalidResponse {
            service: "weather",
            message: "main block is missing temp or humidity".to_string(),
        });
    };
    if !temp.is_finite() || !humidity.is_finite() {
        return Err(Error::InvalidResponse {
            service: "weather",
            message: format!("non-finite temp {temp} or humidity {humidity}"),
        });
    }

    Ok(WeatherObservation {
        temperature: temp,
        humidity: humidity.clamp(0.0, 100.0).round() as u8,
        timestamp: OffsetDateTime::now_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_response_parsing() {
        let json = r#"{"main": {"temp": 31.4, "humidity": 62, "pressure": 1002}}"#;
        let parsed: WeatherResponse = serde_json::from_str(json).unwrap();
        let main = parsed.main.unwrap();
        assert_eq!(main.temp, Some(31.4));
        assert_eq!(main.humidity, Some(62.0));
    }

    #[test]
    fn test_weather_response_missing_main() {
        let parsed: WeatherResponse = serde_json::from_str(r#"{"cod": 200}"#).unwrap();
        assert!(parsed.main.is_none());
    }

    #[test]
    fn test_weather_response_partial_main() {
        let parsed: WeatherResponse =
            serde_json::from_str(r#"{"main": {"temp": 20.0}}"#).unwrap();
        let main = parsed.main.unwrap();
        assert!(main.humidity.is_none());
    }
}
