use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::path::Component;
use std::sync::Arc;

use placement_cell::config::StorageConfig;
use placement_cell::error::AppError;
use placement_cell::workflows::placement::{
    placement_router, CatalogService, PlacementLifecycleService, PlacementStore, StatusBroadcast,
    StudentDirectory,
};

pub(crate) fn app_router<S, D, B>(
    lifecycle: Arc<PlacementLifecycleService<S, D, B>>,
    catalog: Arc<CatalogService<S, D>>,
) -> axum::Router
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    placement_router(lifecycle, catalog)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/uploads/*file", axum::routing::get(serve_upload))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serve stored attachments (resumes, interview artifacts) referenced by
/// the placement records. Only plain file names below the upload directory
/// are reachable.
pub(crate) async fn serve_upload(
    Extension(storage): Extension<Arc<StorageConfig>>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let relative = std::path::Path::new(&file);
    let traversal = relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));
    if traversal {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such upload",
        )));
    }

    let full_path = storage.upload_dir.join(relative);
    let bytes = tokio::fs::read(&full_path).await?;
    let content_type = mime_guess::from_path(&full_path)
        .first_or_octet_stream()
        .to_string();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        bytes,
    ))
}
