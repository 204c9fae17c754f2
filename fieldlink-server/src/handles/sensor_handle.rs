use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::errors::{ApiError, TelemetryError};
use crate::models::DeviceId;
use crate::services::TelemetryService;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RecentQuery {
    pub device_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Clone)]
pub struct SensorState {
    pub telemetry_service: Arc<TelemetryService>,
}

pub async fn get_recent_readings(
    Query(query): Query<RecentQuery>,
    State(state): State<SensorState>,
) -> Result<impl IntoResponse, ApiError> {
    let device_id = query
        .device_id
        .as_deref()
        .map(|raw| DeviceId::parse(raw).ok_or(TelemetryError::InvalidDeviceId))
        .transpose()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let readings = state.telemetry_service.recent(device_id.as_ref(), limit).await?;

    Ok(Json(readings))
}
