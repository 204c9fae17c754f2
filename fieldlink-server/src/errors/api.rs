use super::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Telemetry error: {0}")]
    TelemetryError(#[from] TelemetryError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
