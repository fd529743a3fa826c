use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPlacementStore, InMemoryStudentDirectory, LoggingBroadcast};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use placement_cell::config::AppConfig;
use placement_cell::error::AppError;
use placement_cell::telemetry;
use placement_cell::workflows::placement::{CatalogService, PlacementLifecycleService};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;
    std::fs::create_dir_all(&config.storage.upload_dir)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryPlacementStore::default());
    let directory = Arc::new(InMemoryStudentDirectory::default());
    let broadcast = Arc::new(LoggingBroadcast::default());
    let lifecycle = Arc::new(PlacementLifecycleService::new(
        store.clone(),
        directory.clone(),
        broadcast,
    ));
    let catalog = Arc::new(CatalogService::new(store, directory));

    let app = app_router(lifecycle, catalog)
        .layer(Extension(app_state))
        .layer(Extension(Arc::new(config.storage.clone())))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "placement portal backend ready");

    axum::serve(listener, app).await?;
    Ok(())
}
