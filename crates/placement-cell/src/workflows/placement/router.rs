use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::catalog::{CatalogError, CatalogService};
use super::domain::{FieldSpec, JobDraft, JobPatch};
use super::repository::{PlacementStore, RepositoryError, StatusBroadcast, StudentDirectory};
use super::service::{
    InterviewRequest, PlacementLifecycleService, PlacementServiceError, SubmissionRequest,
};

/// Router builder exposing the placement lifecycle and the admin catalog.
pub fn placement_router<S, D, B>(
    lifecycle: Arc<PlacementLifecycleService<S, D, B>>,
    catalog: Arc<CatalogService<S, D>>,
) -> Router
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    lifecycle_routes(lifecycle).merge(catalog_routes(catalog))
}

fn lifecycle_routes<S, D, B>(service: Arc<PlacementLifecycleService<S, D, B>>) -> Router
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    Router::new()
        .route(
            "/api/v1/placement/applications",
            post(submit_handler::<S, D, B>).get(all_applications_handler::<S, D, B>),
        )
        .route(
            "/api/v1/placement/applications/:user_id",
            get(user_applications_handler::<S, D, B>),
        )
        .route("/api/v1/placement/apply", post(apply_handler::<S, D, B>))
        .route(
            "/api/v1/placement/status/:user_id",
            get(status_handler::<S, D, B>),
        )
        .route(
            "/api/v1/placement/trackings/:tracking_id/interview-scheduled",
            put(mark_scheduled_handler::<S, D, B>),
        )
        .route(
            "/api/v1/placement/interviews",
            post(schedule_interview_handler::<S, D, B>),
        )
        .route(
            "/api/v1/placement/notifications/:user_id",
            get(notifications_handler::<S, D, B>),
        )
        .route(
            "/api/v1/placement/jobs/:job_id/form",
            post(define_form_handler::<S, D, B>).get(get_form_handler::<S, D, B>),
        )
        .with_state(service)
}

fn catalog_routes<S, D>(service: Arc<CatalogService<S, D>>) -> Router
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/placement/jobs",
            post(post_job_handler::<S, D>).get(list_jobs_handler::<S, D>),
        )
        .route(
            "/api/v1/placement/jobs/:job_id",
            get(get_job_handler::<S, D>)
                .put(edit_job_handler::<S, D>)
                .delete(delete_job_handler::<S, D>),
        )
        .route(
            "/api/v1/placement/interviews/scheduled",
            get(list_interviews_handler::<S, D>),
        )
        .route(
            "/api/v1/placement/students",
            get(list_students_handler::<S, D>),
        )
        .route(
            "/api/v1/placement/students/:user_id/fee-status",
            patch(toggle_fee_handler::<S, D>),
        )
        .route(
            "/api/v1/placement/dashboard",
            get(dashboard_handler::<S, D>),
        )
        .with_state(service)
}

fn lifecycle_error(error: PlacementServiceError) -> Response {
    let status = match &error {
        PlacementServiceError::DuplicateApplication => StatusCode::CONFLICT,
        PlacementServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PlacementServiceError::Identifier(_) => StatusCode::BAD_REQUEST,
        PlacementServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PlacementServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PlacementServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn catalog_error(error: CatalogError) -> Response {
    let status = match &error {
        CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Identifier(_) => StatusCode::BAD_REQUEST,
        CatalogError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        CatalogError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        CatalogError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

type Lifecycle<S, D, B> = Arc<PlacementLifecycleService<S, D, B>>;

async fn submit_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Json(request): Json<SubmissionRequest>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.submit_application(request) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

#[derive(Debug, Deserialize)]
struct DirectApplyRequest {
    user_id: String,
    job_id: String,
    job_title: String,
    company_name: String,
}

async fn apply_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Json(request): Json<DirectApplyRequest>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.apply_direct(
        &request.user_id,
        &request.job_id,
        &request.job_title,
        &request.company_name,
    ) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn user_applications_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.applications_for_user(&user_id) {
        Ok(applications) if applications.is_empty() => (
            StatusCode::OK,
            Json(json!({
                "message": "No applications found",
                "applications": [],
            })),
        )
            .into_response(),
        Ok(applications) => (
            StatusCode::OK,
            Json(json!({ "applications": applications })),
        )
            .into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn all_applications_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.all_applications() {
        Ok(applications) => (
            StatusCode::OK,
            Json(json!({ "applications": applications })),
        )
            .into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn status_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    let today = Local::now().date_naive();
    match service.placement_status(&user_id, today) {
        Ok(trackings) => (StatusCode::OK, Json(trackings)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn mark_scheduled_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Path(tracking_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.mark_interview_scheduled(&tracking_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn schedule_interview_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Json(request): Json<InterviewRequest>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.schedule_interview(request) {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn notifications_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.notifications_for(&user_id) {
        Ok(notifications) => (StatusCode::OK, Json(notifications)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

#[derive(Debug, Deserialize)]
struct DefineFormRequest {
    fields: Vec<FieldSpec>,
}

async fn define_form_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Path(job_id): Path<String>,
    Json(request): Json<DefineFormRequest>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.define_form(&job_id, request.fields) {
        Ok(form) => (StatusCode::CREATED, Json(form)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

async fn get_form_handler<S, D, B>(
    State(service): State<Lifecycle<S, D, B>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
    B: StatusBroadcast + 'static,
{
    match service.form_for_job(&job_id) {
        Ok(form) => (StatusCode::OK, Json(form)).into_response(),
        Err(error) => lifecycle_error(error),
    }
}

type Catalog<S, D> = Arc<CatalogService<S, D>>;

async fn post_job_handler<S, D>(
    State(service): State<Catalog<S, D>>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.post_job(draft) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn list_jobs_handler<S, D>(State(service): State<Catalog<S, D>>) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.list_jobs() {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn get_job_handler<S, D>(
    State(service): State<Catalog<S, D>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.get_job(&job_id) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn edit_job_handler<S, D>(
    State(service): State<Catalog<S, D>>,
    Path(job_id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.edit_job(&job_id, patch) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn delete_job_handler<S, D>(
    State(service): State<Catalog<S, D>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.delete_job(&job_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Job deleted successfully" })),
        )
            .into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn list_interviews_handler<S, D>(State(service): State<Catalog<S, D>>) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.scheduled_interviews() {
        Ok(interviews) => (StatusCode::OK, Json(interviews)).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn list_students_handler<S, D>(State(service): State<Catalog<S, D>>) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.list_students() {
        Ok(students) => (StatusCode::OK, Json(students)).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn toggle_fee_handler<S, D>(
    State(service): State<Catalog<S, D>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.toggle_fee_paid(&user_id) {
        Ok(fee_paid) => (StatusCode::OK, Json(json!({ "feePaid": fee_paid }))).into_response(),
        Err(error) => catalog_error(error),
    }
}

async fn dashboard_handler<S, D>(State(service): State<Catalog<S, D>>) -> Response
where
    S: PlacementStore + 'static,
    D: StudentDirectory + 'static,
{
    match service.dashboard_stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => catalog_error(error),
    }
}
