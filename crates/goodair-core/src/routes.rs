//! Traffic-incident fetcher and route segments.
//!
//! Incidents within a bounding box around the location are mapped to road
//! segments with an estimated speed derived from the reported delay
//! magnitude. Unlike the flow fetcher there is no degraded fallback: the
//! caller shows a placeholder when this fails.

use goodair_types::{CongestionLevel, Location, RouteSegment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, ApiConfig};
use crate::error::{Error, Result};

/// Half-width of the incident search box, degrees.
pub const BBOX_HALF_WIDTH: f64 = 0.1;

/// Assumed free-flow speed for incident segments, km/h.
pub const ASSUMED_FREE_FLOW: f32 = 50.0;

/// Floor for the estimated speed through an incident, km/h.
const MIN_ESTIMATED_SPEED: f32 = 10.0;

/// Active incidents mapped to affected segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutesSummary {
    /// Number of active incidents in the box.
    pub active_incidents: usize,
    /// Affected segments.
    pub segments: Vec<RouteSegment>,
}

#[derive(Deserialize)]
struct IncidentsResponse {
    #[serde(default)]
    incidents: Vec<Incident>,
}

#[derive(Deserialize)]
struct Incident {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    properties: Option<IncidentProperties>,
    #[serde(default)]
    geometry: Option<IncidentGeometry>,
}

#[derive(Deserialize)]
struct IncidentProperties {
    #[serde(rename = "magnitudeOfDelay", default)]
    magnitude_of_delay: u8,
}

#[derive(Deserialize)]
struct IncidentGeometry {
    #[serde(default)]
    coordinates: Value,
}

/// Estimated speed through an incident from its delay magnitude (0-4).
fn estimated_speed(magnitude: u8) -> f32 {
    (ASSUMED_FREE_FLOW - 10.0 * f32::from(magnitude)).max(MIN_ESTIMATED_SPEED)
}

/// Flatten incident geometry into (longitude, latitude) pairs.
///
/// The upstream sends either a LineString (`[[lon, lat], ...]`) or a
/// single point; anything else yields an empty path.
fn flatten_coordinates(value: &Value) -> Vec<[f64; 2]> {
    match value {
        Value::Array(items) => match items.as_slice() {
            [Value::Number(lon), Value::Number(lat)] => {
                match (lon.as_f64(), lat.as_f64()) {
                    (Some(lon), Some(lat)) => vec![[lon, lat]],
                    _ => Vec::new(),
                }
            }
            _ => items.iter().flat_map(flatten_coordinates).collect(),
        },
        _ => Vec::new(),
    }
}

/// Fetch active incidents in a box around the location.
///
/// # Errors
///
/// Fails when no API key is configured or the request fails. There is no
/// degraded fallback here.
pub async fn fetch_incidents(
    client: &ApiClient,
    config: &ApiConfig,
    location: &Location,
) -> Result<RoutesSummary> {
    let key = config
        .traffic_key
        .as_deref()
        .ok_or(Error::MissingApiKey("traffic"))?;
    let bbox = format!(
        "{},{},{},{}",
        location.longitude - BBOX_HALF_WIDTH,
        location.latitude - BBOX_HALF_WIDTH,
        location.longitude + BBOX_HALF_WIDTH,
        location.latitude + BBOX_HALF_WIDTH,
    );

    let response: IncidentsResponse = client
        .get_json(
            &config.incidents_url,
            &[
                ("key", key),
                ("bbox", &bbox),
                ("fields", "{incidents{id,geometry{coordinates},properties{magnitudeOfDelay}}}"),
            ],
        )
        .await?;

    let segments: Vec<RouteSegment> = response
        .incidents
        .iter()
        .enumerate()
        .map(|(i, incident)| {
            let magnitude = incident
                .properties
                .as_ref()
                .map_or(0, |p| p.magnitude_of_delay);
            let current_speed = estimated_speed(magnitude);
            RouteSegment {
                id: incident
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("incident-{i}")),
                current_speed,
                free_flow_speed: ASSUMED_FREE_FLOW,
                congestion: CongestionLevel::from_speeds(current_speed, ASSUMED_FREE_FLOW),
                coordinates: incident
                    .geometry
                    .as_ref()
                    .map(|g| flatten_coordinates(&g.coordinates))
                    .unwrap_or_default(),
            }
        })
        .collect();

    Ok(RoutesSummary {
        active_incidents: segments.len(),
        segments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_speed_by_magnitude() {
        assert_eq!(estimated_speed(0), 50.0);
        assert_eq!(estimated_speed(1), 40.0);
        assert_eq!(estimated_speed(2), 30.0);
        assert_eq!(estimated_speed(4), 10.0);
        // Floored
        assert_eq!(estimated_speed(5), 10.0);
    }

    #[test]
    fn test_congestion_mapping_follows_speed() {
        assert_eq!(
            CongestionLevel::from_speeds(estimated_speed(0), ASSUMED_FREE_FLOW),
            CongestionLevel::Low
        );
        assert_eq!(
            CongestionLevel::from_speeds(estimated_speed(2), ASSUMED_FREE_FLOW),
            CongestionLevel::Medium
        );
        assert_eq!(
            CongestionLevel::from_speeds(estimated_speed(4), ASSUMED_FREE_FLOW),
            CongestionLevel::High
        );
    }

    #[test]
    fn test_flatten_linestring() {
        let value = serde_json::json!([[77.1, 28.5], [77.2, 28.6]]);
        assert_eq!(
            flatten_coordinates(&value),
            vec![[77.1, 28.5], [77.2, 28.6]]
        );
    }

    #[test]
    fn test_flatten_point() {
        let value = serde_json::json!([77.1, 28.5]);
        assert_eq!(flatten_coordinates(&value), vec![[77.1, 28.5]]);
    }

    #[test]
    fn test_flatten_garbage() {
        assert!(flatten_coordinates(&serde_json::json!("oops")).is_empty());
        assert!(flatten_coordinates(&Value::Null).is_empty());
    }

    #[test]
    fn test_incidents_response_parsing() {
        let json = r#"{
            "incidents": [
                {
                    "id": "abc123",
                    "geometry": {"coordinates": [[77.1, 28.5], [77.15, 28.55]]},
                    "properties": {"magnitudeOfDelay": 3}
                },
                {"properties": {"magnitudeOfDelay": 0}}
            ]
        }"#;
        let parsed: IncidentsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.incidents.len(), 2);
        assert_eq!(
            parsed.incidents[0]
                .properties
                .as_ref()
                .unwrap()
                .magnitude_of_delay,
            3
        );
        assert!(parsed.incidents[1].id.is_none());
    }
}
