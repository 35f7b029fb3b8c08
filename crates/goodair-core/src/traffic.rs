//! Traffic flow: density derivation and the flow-segment fetcher.

use goodair_types::{Location, TrafficFlow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{ApiClient, ApiConfig};
use crate::error::{Error, Result};

/// Vehicles per km at a standstill. Density scales linearly with the
/// congestion ratio up to this figure before clamping.
pub const JAM_DENSITY: f64 = 200.0;

/// Traffic density in [0, 100] derived from a current/free-flow speed pair.
///
/// `JAM_DENSITY * (1 - current/free_flow)`, rounded and clamped. A road at
/// free-flow speed scores 0; a standstill saturates at 100.
///
/// # Errors
///
/// Returns [`Error::InvalidSpeed`] when either speed is non-finite, the
/// current speed is negative, or the free-flow speed is not positive.
/// These inputs indicate bad upstream data and are never retried.
pub fn density(current_speed: f64, free_flow_speed: f64) -> Result<u8> {
    if !current_speed.is_finite() || !free_flow_speed.is_finite() {
        return Err(Error::InvalidSpeed(format!(
            "speeds must be finite, got current={current_speed}, free_flow={free_flow_speed}"
        )));
    }
    if current_speed < 0.0 {
        return Err(Error::InvalidSpeed(format!(
            "current speed {current_speed} is negative"
        )));
    }
    if free_flow_speed <= 0.0 {
        return Err(Error::InvalidSpeed(format!(
            "free-flow speed {free_flow_speed} is not positive"
        )));
    }

    let raw = JAM_DENSITY * (1.0 - current_speed / free_flow_speed);
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Flow measurements plus the derived density for one measurement point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSummary {
    /// Raw flow measurements.
    pub flow: TrafficFlow,
    /// Derived density in [0, 100].
    pub density: u8,
}

impl TrafficSummary {
    /// The degraded value shown when the flow fetch fails: an empty road.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            flow: TrafficFlow::default(),
            density: 0,
        }
    }
}

#[derive(Deserialize)]
struct FlowResponse {
    #[serde(rename = "flowSegmentData")]
    flow_segment_data: Option<FlowSegmentData>,
}

#[derive(Deserialize)]
struct FlowSegmentData {
    #[serde(rename = "currentSpeed")]
    current_speed: f32,
    #[serde(rename = "freeFlowSpeed")]
    free_flow_speed: f32,
    #[serde(default)]
    confidence: f32,
}

/// Fetch flow measurements for the road segment nearest the location.
///
/// # Errors
///
/// Fails when no API key is configured, the request fails, or the response
/// carries no `flowSegmentData`.
pub async fn fetch_flow(
    client: &ApiClient,
    config: &ApiConfig,
    location: &Location,
) -> Result<TrafficSummary> {
    let key = config
        .traffic_key
        .as_deref()
        .ok_or(Error::MissingApiKey("traffic"))?;
    let point = format!("{},{}", location.latitude, location.longitude);

    let response: FlowResponse = client
        .get_json(&config.traffic_url, &[("key", key), ("point", &point)])
        .await?;

    let segment = response
        .flow_segment_data
        .ok_or(Error::InvalidResponse {
            service: "traffic",
            message: "response has no flowSegmentData".to_string(),
        })?;

    let flow = TrafficFlow {
        current_speed: segment.current_speed,
        free_flow_speed: segment.free_flow_speed,
        confidence: segment.confidence,
    };
    let density = density(f64::from(flow.current_speed), f64::from(flow.free_flow_speed))?;

    Ok(TrafficSummary { flow, density })
}

/// Fetch flow, degrading to the zero-density fallback on any failure.
pub async fn fetch_flow_or_fallback(
    client: &ApiClient,
    config: &ApiConfig,
    location: &Location,
) -> TrafficSummary {
    match fetch_flow(client, config, location).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!("traffic flow fetch failed, using empty-road fallback: {e}");
            TrafficSummary::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_free_flow_is_zero() {
        assert_eq!(density(50.0, 50.0).unwrap(), 0);
    }

    #[test]
    fn test_density_standstill_clamps_to_100() {
        // Raw value would be 200
        assert_eq!(density(0.0, 50.0).unwrap(), 100);
    }

    #[test]
    fn test_density_midpoint() {
        // 200 * (1 - 37.5/50) = 50
        assert_eq!(density(37.5, 50.0).unwrap(), 50);
    }

    #[test]
    fn test_density_faster_than_free_flow_clamps_to_zero() {
        assert_eq!(density(60.0, 50.0).unwrap(), 0);
    }

    #[test]
    fn test_density_rejects_bad_input() {
        assert!(matches!(density(-1.0, 50.0), Err(Error::InvalidSpeed(_))));
        assert!(matches!(density(10.0, 0.0), Err(Error::InvalidSpeed(_))));
        assert!(matches!(density(10.0, -5.0), Err(Error::InvalidSpeed(_))));
        assert!(matches!(
            density(f64::NAN, 50.0),
            Err(Error::InvalidSpeed(_))
        ));
        assert!(matches!(
            density(10.0, f64::INFINITY),
            Err(Error::InvalidSpeed(_))
        ));
    }

    #[test]
    fn test_fallback_is_empty_road() {
        let fallback = TrafficSummary::fallback();
        assert_eq!(fallback.density, 0);
        assert_eq!(fallback.flow.current_speed, 0.0);
    }

    #[test]
    fn test_flow_response_parsing() {
        let json = r#"{
            "flowSegmentData": {
                "currentSpeed": 32,
                "freeFlowSpeed": 50,
                "confidence": 0.95
            }
        }"#;
        let parsed: FlowResponse = serde_json::from_str(json).unwrap();
        let segment = parsed.flow_segment_data.unwrap();
        assert_eq!(segment.current_speed, 32.0);
        assert_eq!(segment.free_flow_speed, 50.0);
    }

    #[test]
    fn test_flow_response_missing_segment() {
        let parsed: FlowResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.flow_segment_data.is_none());
    }
}
