//! JSON REST handlers for sensor readings.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use greencue_app::ports::{CommandStore, DeviceTransport, LatestValueCache, ReadingStore, RuleStore};
use greencue_app::services::DEFAULT_RECENT_LIMIT;
use greencue_domain::error::{GreenCueError, NotFoundError, ValidationError};
use greencue_domain::sensor::{NewReading, SensorReading, SensorType};
use greencue_domain::time::{Timestamp, parse_rfc3339};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for submitting a reading.
#[derive(Deserialize)]
pub struct SubmitReadingRequest {
    #[serde(rename = "type", alias = "sensor_type")]
    pub sensor_type: Option<String>,
    pub value: Option<f32>,
    pub unit: Option<String>,
    #[serde(alias = "deviceId")]
    pub device_id: Option<String>,
}

impl SubmitReadingRequest {
    fn into_new_reading(self) -> Result<NewReading, GreenCueError> {
        let mut builder = NewReading::builder();
        if let Some(code) = self.sensor_type {
            builder = builder.sensor_type(SensorType::from_code(&code)?);
        }
        if let Some(value) = self.value {
            builder = builder.value(value);
        }
        if let Some(unit) = self.unit {
            builder = builder.unit(unit);
        }
        if let Some(device_id) = self.device_id {
            builder = builder.device_id(device_id);
        }
        builder.build()
    }
}

/// Query parameters of the "recent" endpoint.
#[derive(Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

/// Query parameters of the range endpoint, both RFC 3339.
#[derive(Deserialize)]
pub struct RangeParams {
    pub start: String,
    pub end: String,
}

/// Possible responses from the submit endpoint.
pub enum SubmitResponse {
    Created(Json<SensorReading>),
}

impl IntoResponse for SubmitResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

fn parse_timestamp(input: &str) -> Result<Timestamp, ValidationError> {
    parse_rfc3339(input).map_err(|_| ValidationError::InvalidTimestamp(input.to_string()))
}

/// `POST /api/sensor/data`: record a reading and run the automation rules.
pub async fn submit<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Json(req): Json<SubmitReadingRequest>,
) -> Result<SubmitResponse, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let reading = req.into_new_reading()?;
    let saved = state.ingestion.submit_reading(reading).await?;
    Ok(SubmitResponse::Created(Json(saved)))
}

/// `GET /api/sensor/latest`: newest stored reading of every sensor type.
pub async fn latest_per_type<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
) -> Result<Json<Vec<SensorReading>>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let readings = state.reading_service.latest_per_type().await?;
    Ok(Json(readings))
}

/// `GET /api/sensor/latest/{type}`: cached latest reading, 404 on miss.
pub async fn latest<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(code): Path<String>,
) -> Result<Json<SensorReading>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let sensor_type = SensorType::from_code(&code)?;
    let reading = state
        .reading_service
        .latest(sensor_type)
        .await
        .ok_or_else(|| NotFoundError {
            entity: "SensorReading",
            id: sensor_type.code().to_string(),
        })?;
    Ok(Json(reading))
}

/// `GET /api/sensor/{type}/recent?limit=`: newest readings first.
pub async fn recent<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(code): Path<String>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<SensorReading>>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let sensor_type = SensorType::from_code(&code)?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let readings = state.reading_service.recent(sensor_type, limit).await?;
    Ok(Json(readings))
}

/// `GET /api/sensor/{type}/range?start=&end=`: readings in an inclusive window.
pub async fn range<RS, C, R, S, T>(
    State(state): State<AppState<RS, C, R, S, T>>,
    Path(code): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<SensorReading>>, ApiError>
where
    RS: ReadingStore + Send + Sync + 'static,
    C: LatestValueCache + Send + Sync + 'static,
    R: RuleStore + Send + Sync + 'static,
    S: CommandStore + Send + Sync + 'static,
    T: DeviceTransport + Send + Sync + 'static,
{
    let sensor_type = SensorType::from_code(&code)?;
    let from = parse_timestamp(&params.start)?;
    let to = parse_timestamp(&params.end)?;
    let readings = state
        .reading_service
        .in_range(sensor_type, from, to)
        .await?;
    Ok(Json(readings))
}

/// `GET /api/sensor/types`: the sensor type codes.
pub async fn types() -> Json<Vec<&'static str>> {
    Json(SensorType::ALL.into_iter().map(SensorType::code).collect())
}
