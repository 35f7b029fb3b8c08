//! REST API endpoints for the goodair-service.
//!
//! # Concurrency and Lock Acquisition
//!
//! Handlers acquire locks in a consistent order to prevent deadlocks:
//! `config` (if needed), then `store`. The store mutex is held only for
//! the duration of the database call, never across an upstream fetch.
//!
//! # Error Handling
//!
//! All endpoints return structured JSON errors via [`AppError`]. Upstream
//! fetch failures map to 502, settings validation failures to 400, and
//! store errors to 500.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use goodair_core::{airquality, emissions, forecast, percent_change, routes, traffic, weather};
use goodair_store::SampleQuery;
use goodair_types::{
    AirQualitySample, AqiCategory, CongestionLevel, EmissionEstimate, ForecastPoint, Location,
    PollutantCode, RouteSegment, Settings, WeatherObservation,
};

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/api/health", get(health))
        // Open-data proxy
        .route("/api/air-quality", get(get_air_quality))
        // Stored window
        .route("/api/current", get(get_current))
        .route("/api/samples", get(get_samples).delete(delete_samples))
        // Derivations and on-demand fetches
        .route("/api/forecast", get(get_forecast))
        .route("/api/traffic", get(get_traffic))
        .route("/api/weather", get(get_weather))
        .route("/api/routes", get(get_routes))
        .route("/api/emissions", get(get_emissions))
        // Location and settings
        .route("/api/location", get(get_location))
        .route("/api/settings", get(get_settings).put(put_settings))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
    })
}

/// Proxy the open-data station feed.
///
/// The upstream key stays server-side; the city filter comes from the
/// service config. Upstream failure maps to 502.
async fn get_air_quality(
    State(state): State<Arc<AppState>>,
) -> Result<Json<airquality::OpenDataSnapshot>, AppError> {
    let city = {
        let config = state.config.read().await;
        config.api.city_filter.clone()
    };

    let snapshot = airquality::fetch_open_data(&state.client, &state.api, city.as_deref()).await?;
    Ok(Json(snapshot))
}

/// The latest reading, decorated for the dashboard's main card.
#[derive(Debug, Serialize)]
pub struct CurrentResponse {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub aqi: u16,
    pub category: AqiCategory,
    pub color: &'static str,
    pub advisory: &'static str,
    pub dominant_pollutant: PollutantCode,
    /// Percent change against the previous stored sample.
    pub change_percent: f64,
}

/// Latest stored sample with category, color, and trend.
async fn get_current(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CurrentResponse>, AppError> {
    let recent = {
        let store = state.store.lock().await;
        store.query_samples(&SampleQuery::new().newest_first().limit(2))?
    };

    let latest = recent
        .first()
        .ok_or_else(|| AppError::NotFound("No samples collected yet".to_string()))?;
    let previous = recent.get(1).map(|s| s.aqi);

    let category = AqiCategory::from_aqi(latest.aqi);
    Ok(Json(CurrentResponse {
        timestamp: latest.timestamp,
        aqi: latest.aqi,
        category,
        color: category.color(),
        advisory: category.advisory(),
        dominant_pollutant: latest.pollutants.dominant(),
        change_percent: percent_change(previous, latest.aqi),
    }))
}

/// Query parameters for the sample window.
#[derive(Debug, Deserialize)]
pub struct SamplesParams {
    /// Unix timestamp (seconds), inclusive lower bound.
    pub since: Option<i64>,
    /// Unix timestamp (seconds), inclusive upper bound.
    pub until: Option<i64>,
    /// Maximum number of samples.
    pub limit: Option<u32>,
    /// Return newest samples first.
    #[serde(default)]
    pub newest_first: bool,
}

/// Stored samples, oldest first unless `newest_first` is set.
async fn get_samples(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SamplesParams>,
) -> Result<Json<Vec<AirQualitySample>>, AppError> {
    let mut query = SampleQuery::new();
    if let Some(since) = params.since {
        query = query.since(parse_unix(since, "since")?);
    }
    if let Some(until) = params.until {
        query = query.until(parse_unix(until, "until")?);
    }
    if let Some(limit) = params.limit {
        query = query.limit(limit);
    }
    if params.newest_first {
        query = query.newest_first();
    }

    let store = state.store.lock().await;
    Ok(Json(store.query_samples(&query)?))
}

fn parse_unix(ts: i64, field: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::from_unix_timestamp(ts)
        .map_err(|_| AppError::BadRequest(format!("invalid {field} timestamp: {ts}")))
}

/// Clear response.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// Wipe the sample window and reset settings to defaults.
async fn delete_samples(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, AppError> {
    let mut store = state.store.lock().await;
    store.clear()?;
    Ok(Json(ClearResponse { cleared: true }))
}

/// Query parameters for the forecast.
#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    /// Number of hourly points (default 96, max 168).
    pub hours: Option<usize>,
}

/// Base AQI assumed when no samples have been collected yet.
const DEFAULT_FORECAST_BASE: u16 = 50;

/// Longest forecast horizon served.
const MAX_FORECAST_HOURS: usize = 168;

/// Synthetic hourly forecast anchored at the last known AQI.
async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<Vec<ForecastPoint>>, AppError> {
    let hours = params.hours.unwrap_or(forecast::DEFAULT_HOURS);
    if hours == 0 || hours > MAX_FORECAST_HOURS {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_FORECAST_HOURS}"
        )));
    }

    let base = {
        let store = state.store.lock().await;
        store
            .latest_sample()?
            .map_or(DEFAULT_FORECAST_BASE, |s| s.aqi)
    };

    let points = forecast::synthetic(base, hours, OffsetDateTime::now_utc(), &mut rand::rng());
    Ok(Json(points))
}

/// Traffic card payload.
#[derive(Debug, Serialize)]
pub struct TrafficResponse {
    pub current_speed: f32,
    pub free_flow_speed: f32,
    pub confidence: f32,
    pub density: u8,
    pub congestion: CongestionLevel,
}

/// Current traffic flow, degrading to the empty-road fallback on failure.
async fn get_traffic(State(state): State<Arc<AppState>>) -> Json<TrafficResponse> {
    let location = state.location().await;
    let summary = traffic::fetch_flow_or_fallback(&state.client, &state.api, &location).await;

    Json(TrafficResponse {
        current_speed: summary.flow.current_speed,
        free_flow_speed: summary.flow.free_flow_speed,
        confidence: summary.flow.confidence,
        density: summary.density,
        congestion: CongestionLevel::from_speeds(
            summary.flow.current_speed,
            summary.flow.free_flow_speed,
        ),
    })
}

/// Current weather. Upstream failure maps to 502.
async fn get_weather(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WeatherObservation>, AppError> {
    let location = state.location().await;
    let observation = weather::fetch_current(&state.client, &state.api, &location).await?;
    Ok(Json(observation))
}

/// Routes card payload.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub active_incidents: usize,
    pub segments: Vec<RouteSegment>,
}

/// Active incidents near the location. Upstream failure maps to 502.
async fn get_routes(State(state): State<Arc<AppState>>) -> Result<Json<RoutesResponse>, AppError> {
    let location = state.location().await;
    let summary = routes::fetch_incidents(&state.client, &state.api, &location).await?;
    Ok(Json(RoutesResponse {
        active_incidents: summary.active_incidents,
        segments: summary.segments,
    }))
}

/// Emissions card payload.
#[derive(Debug, Serialize)]
pub struct EmissionsResponse {
    pub density: u8,
    pub estimates: Vec<EmissionEstimate>,
}

/// Per-vehicle-class CO2e estimates. Upstream failure maps to 502.
async fn get_emissions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmissionsResponse>, AppError> {
    let location = state.location().await;
    let (summary, estimates) =
        emissions::fetch_estimates(&state.client, &state.api, &location).await?;
    Ok(Json(EmissionsResponse {
        density: summary.density,
        estimates,
    }))
}

/// The location the service reports for.
async fn get_location(State(state): State<Arc<AppState>>) -> Json<Location> {
    Json(state.location().await)
}

/// Current settings.
async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.settings()?))
}

/// Update settings. Range violations map to 400 and nothing is written.
async fn put_settings(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    let store = state.store.lock().await;
    store.update_settings(&settings)?;
    Ok(Json(settings))
}

// ==========================================================================
// Errors
// ==========================================================================

/// API error type, rendered as structured JSON.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Upstream(goodair_core::Error),
    Store(goodair_store::Error),
}

impl From<goodair_store::Error> for AppError {
    fn from(e: goodair_store::Error) -> Self {
        match e {
            goodair_store::Error::Validation(msg) => AppError::BadRequest(msg),
            other => AppError::Store(other),
        }
    }
}

impl From<goodair_core::Error> for AppError {
    fn from(e: goodair_core::Error) -> Self {
        AppError::Upstream(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(e) => {
                tracing::warn!("upstream failure: {e}");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("store failure: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, Json(body)).into_response()
    }
}
