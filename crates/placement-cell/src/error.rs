use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::placement::{CatalogError, PlacementServiceError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failures surfaced by the hosting binary: configuration, telemetry
/// bootstrap, socket/server errors, filesystem access for served uploads,
/// and placement-domain failures reaching the CLI paths. HTTP handlers for
/// the placement surface map their errors inside the placement router
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("placement error: {0}")]
    Placement(#[from] PlacementServiceError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::Placement(_) | AppError::Catalog(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
