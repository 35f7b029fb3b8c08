//! Air-quality fetchers: the commercial current-conditions API and the
//! data.gov.in open-data station feed.

use goodair_types::{AirQualitySample, AqiCategory, Pollutants};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::client::{ApiClient, ApiConfig};
use crate::error::{Error, Result};

/// Placeholder used when a pollutant entry carries no source attribution.
pub const NO_SOURCE_INFO: &str = "Information not available";

/// Index code of the national AQI in the current-conditions response.
const NAQI_INDEX_CODE: &str = "ind_cpcb";

/// One pollutant entry from the current-conditions response, kept in
/// display form alongside the typed [`Pollutants`] summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantDetail {
    /// Pollutant code as reported (e.g. "pm25").
    pub code: String,
    /// Human-readable name.
    pub display_name: String,
    /// Concentration value.
    pub value: f32,
    /// Concentration unit as reported.
    pub unit: String,
    /// Source attribution, or [`NO_SOURCE_INFO`].
    pub sources: String,
}

/// A complete current-conditions reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    /// The sample to append to the rolling window.
    pub sample: AirQualitySample,
    /// Severity category of the sample.
    pub category: AqiCategory,
    /// Code of the dominant pollutant as reported by the index.
    pub dominant_pollutant: Option<String>,
    /// Per-pollutant display details.
    pub pollutants: Vec<PollutantDetail>,
    /// General-population health recommendation, when provided.
    pub recommendation: Option<String>,
}

#[derive(Serialize)]
struct ConditionsRequest<'a> {
    location: RequestLocation,
    #[serde(rename = "extraComputations")]
    extra_computations: &'a [&'a str],
    #[serde(rename = "languageCode")]
    language_code: &'a str,
}

#[derive(Serialize)]
struct RequestLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct ConditionsResponse {
    #[serde(default)]
    indexes: Vec<IndexEntry>,
    #[serde(default)]
    pollutants: Vec<PollutantEntry>,
    #[serde(rename = "healthRecommendations", default)]
    health_recommendations: Option<HealthRecommendations>,
}

#[derive(Deserialize)]
struct IndexEntry {
    code: String,
    aqi: f64,
    #[serde(rename = "dominantPollutant", default)]
    dominant_pollutant: Option<String>,
}

#[derive(Deserialize)]
struct PollutantEntry {
    code: String,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(default)]
    concentration: Option<Concentration>,
    #[serde(rename = "additionalInfo", default)]
    additional_info: Option<AdditionalInfo>,
}

#[derive(Deserialize)]
struct Concentration {
    value: f32,
    #[serde(default)]
    units: Option<String>,
}

#[derive(Deserialize)]
struct AdditionalInfo {
    #[serde(default)]
    sources: Option<String>,
}

#[derive(Deserialize)]
struct HealthRecommendations {
    #[serde(rename = "generalPopulation", default)]
    general_population: Option<String>,
}

/// Fetch current conditions for a location from the commercial API.
///
/// # Errors
///
/// Fails when no key is configured, the request fails, or the response
/// lacks the national AQI index.
pub async fn fetch_current(
    client: &ApiClient,
    config: &ApiConfig,
    latitude: f64,
    longitude: f64,
) -> Result<CurrentConditions> {
    let key = config
        .air_quality_key
        .as_deref()
        .ok_or(Error::MissingApiKey("air-quality"))?;

    let body = ConditionsRequest {
        location: RequestLocation {
            latitude,
            longitude,
        },
        extra_computations: &[
            "LOCAL_AQI",
            "POLLUTANT_CONCENTRATION",
            "POLLUTANT_ADDITIONAL_INFO",
            "HEALTH_RECOMMENDATIONS",
        ],
        language_code: "en",
    };

    let response: ConditionsResponse = client
        .post_json(&config.air_quality_url, &[("key", key)], &body)
        .await?;

    let index = response
        .indexes
        .iter()
        .find(|i| i.code == NAQI_INDEX_CODE)
        .ok_or(Error::InvalidResponse {
            service: "air-quality",
            message: format!("response has no {NAQI_INDEX_CODE} index"),
        })?;

    let aqi = index.aqi.clamp(0.0, f64::from(goodair_types::MAX_AQI)).round() as u16;

    let mut concentrations = Pollutants::default();
    let details: Vec<PollutantDetail> = response
        .pollutants
        .iter()
        .map(|p| {
            let value = p.concentration.as_ref().map_or(0.0, |c| c.value);
            match p.code.as_str() {
                "pm25" => concentrations.pm25 = value,
                "pm10" => concentrations.pm10 = value,
                "no2" => concentrations.no2 = value,
                "o3" => concentrations.o3 = value,
                "co" => concentrations.co = value,
                _ => {}
            }
            PollutantDetail {
                code: p.code.clone(),
                display_name: p.display_name.clone().unwrap_or_else(|| p.code.clone()),
                value,
                unit: p
                    .concentration
                    .as_ref()
                    .and_then(|c| c.units.clone())
                    .unwrap_or_default(),
                sources: p
                    .additional_info
                    .as_ref()
                    .and_then(|i| i.sources.clone())
                    .unwrap_or_else(|| NO_SOURCE_INFO.to_string()),
            }
        })
        .collect();

    Ok(CurrentConditions {
        sample: AirQualitySample {
            timestamp: OffsetDateTime::now_utc(),
            aqi,
            pollutants: concentrations,
        },
        category: AqiCategory::from_aqi(aqi),
        dominant_pollutant: index.dominant_pollutant.clone(),
        pollutants: details,
        recommendation: response
            .health_recommendations
            .and_then(|h| h.general_population),
    })
}

// =========================================================================
// Open-data station feed
// =========================================================================

/// One station measurement reshaped from the open-data records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Station name ("Unknown Station" when absent).
    pub station: String,
    /// City name ("Unknown City" when absent).
    pub city: String,
    /// Upstream's last-update string, passed through verbatim.
    pub last_update: String,
    /// Pollutant identifier (e.g. "PM2.5").
    pub pollutant: String,
    /// Average reading, when parseable.
    pub avg: Option<f64>,
}

/// A page of open-data station measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenDataSnapshot {
    /// Total matching records upstream.
    pub total: u64,
    /// Reshaped records for this page.
    pub records: Vec<StationRecord>,
}

#[derive(Deserialize)]
struct OpenDataResponse {
    #[serde(default)]
    total: Value,
    #[serde(default)]
    records: Vec<OpenDataRecord>,
}

#[derive(Deserialize)]
struct OpenDataRecord {
    #[serde(default)]
    station: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    last_update: Option<String>,
    #[serde(default)]
    pollutant_id: Option<String>,
    // Upstream sends numbers, numeric strings, or "NA" here
    #[serde(default)]
    pollutant_avg: Value,
}

fn lenient_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Fetch a page of station measurements from data.gov.in.
///
/// Query shape is fixed (json, limit 100, offset 0) with an optional city
/// filter.
///
/// # Errors
///
/// Fails when no key is configured or the request fails.
pub async fn fetch_open_data(
    client: &ApiClient,
    config: &ApiConfig,
    city: Option<&str>,
) -> Result<OpenDataSnapshot> {
    let key = config
        .open_data_key
        .as_deref()
        .ok_or(Error::MissingApiKey("open-data"))?;

    let mut query = vec![
        ("api-key", key),
        ("format", "json"),
        ("limit", "100"),
        ("offset", "0"),
    ];
    if let Some(city) = city {
        query.push(("filters[city]", city));
    }

    let response: OpenDataResponse = client.get_json(&config.open_data_url, &query).await?;

    let records = response
        .records
        .into_iter()
        .map(|r| StationRecord {
            station: r.station.unwrap_or_else(|| "Unknown Station".to_string()),
            city: r.city.unwrap_or_else(|| "Unknown City".to_string()),
            last_update: r.last_update.unwrap_or_default(),
            pollutant: r.pollutant_id.unwrap_or_default(),
            avg: lenient_f64(&r.pollutant_avg),
        })
        .collect();

    Ok(OpenDataSnapshot {
        total: lenient_f64(&response.total).map_or(0, |t| t as u64),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions_response_parsing() {
        let json = r#"{
            "indexes": [
                {"code": "uaqi", "aqi": 62, "dominantPollutant": "pm25"},
                {"code": "ind_cpcb", "aqi": 182, "dominantPollutant": "pm10"}
            ],
            "pollutants": [
                {
                    "code": "pm10",
                    "displayName": "PM10",
                    "concentration": {"value": 141.5, "units": "PARTS_PER_BILLION"},
                    "additionalInfo": {"sources": "Construction, road dust"}
                },
                {"code": "pm25", "concentration": {"value": 61.0}}
            ],
            "healthRecommendations": {"generalPopulation": "Reduce outdoor exertion."}
        }"#;
        let parsed: ConditionsResponse = serde_json::from_str(json).unwrap();
        let index = parsed
            .indexes
            .iter()
            .find(|i| i.code == NAQI_INDEX_CODE)
            .unwrap();
        assert_eq!(index.aqi, 182.0);
        assert_eq!(index.dominant_pollutant.as_deref(), Some("pm10"));
        assert_eq!(parsed.pollutants.len(), 2);
        assert!(parsed.pollutants[1].additional_info.is_none());
    }

    #[test]
    fn test_open_data_reshaping() {
        let json = r#"{
            "total": "347",
            "records": [
                {
                    "station": "Anand Vihar",
                    "city": "Delhi",
                    "last_update": "30-08-2026 09:00:00",
                    "pollutant_id": "PM2.5",
                    "pollutant_avg": "184"
                },
                {
                    "pollutant_id": "OZONE",
                    "pollutant_avg": "NA"
                }
            ]
        }"#;
        let parsed: OpenDataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(lenient_f64(&parsed.total), Some(347.0));

        let records: Vec<StationRecord> = parsed
            .records
            .into_iter()
            .map(|r| StationRecord {
                station: r.station.unwrap_or_else(|| "Unknown Station".to_string()),
                city: r.city.unwrap_or_else(|| "Unknown City".to_string()),
                last_update: r.last_update.unwrap_or_default(),
                pollutant: r.pollutant_id.unwrap_or_default(),
                avg: lenient_f64(&r.pollutant_avg),
            })
            .collect();

        assert_eq!(records[0].station, "Anand Vihar");
        assert_eq!(records[0].avg, Some(184.0));
        assert_eq!(records[1].station, "Unknown Station");
        assert_eq!(records[1].city, "Unknown City");
        assert_eq!(records[1].avg, None);
    }

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64(&serde_json::json!(42)), Some(42.0));
        assert_eq!(lenient_f64(&serde_json::json!("42.5")), Some(42.5));
        assert_eq!(lenient_f64(&serde_json::json!("NA")), None);
        assert_eq!(lenient_f64(&Value::Null), None);
    }
}
