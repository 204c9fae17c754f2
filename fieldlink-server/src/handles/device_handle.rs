use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::configs::Storage;
use crate::errors::ApiError;
use crate::repositories::DeviceRepository;

#[derive(Clone)]
pub struct DeviceState {
    pub storage: Arc<Storage>,
}

pub async fn get_devices(State(state): State<DeviceState>) -> Result<impl IntoResponse, ApiError> {
    let devices = DeviceRepository::new(state.storage.clone()).find_all().await?;

    Ok(Json(devices))
}
