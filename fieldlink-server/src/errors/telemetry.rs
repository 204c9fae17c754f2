use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Invalid device identifier")]
    InvalidDeviceId,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl TelemetryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TelemetryError::InvalidDeviceId => StatusCode::BAD_REQUEST,
            TelemetryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
