pub mod api;
pub mod command;
pub mod feed;
pub mod gateway;
pub mod registry;
pub mod settings;
pub mod telemetry;

pub use api::ApiError;
pub use command::CommandError;
pub use feed::FeedError;
pub use gateway::GatewayError;
pub use registry::RegistryError;
pub use settings::SettingsError;
pub use telemetry::TelemetryError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, log_message) = match self {
            ApiError::TelemetryError(TelemetryError::Database(e)) | ApiError::DatabaseError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::TelemetryError(e) => (e.status_code(), e.to_string(), None),
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        if let Some(error_id) = log_message {
            error_obj["error_id"] = json!(error_id);
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
