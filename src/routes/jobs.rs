use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{JobListQuery, JobListResponse, JobPostingPayload, JobResponse},
    error::Result,
    models::user::Session,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("search" = Option<String>, Query, description = "Substring over title, description and location"),
        ("job_type" = Option<String>, Query, description = "Employment type token"),
        ("location" = Option<String>, Query, description = "Location substring"),
        ("salary" = Option<String>, Query, description = "Salary bucket: 0-5, 5-10, 10-15 or 15+")
    ),
    responses(
        (status = 200, description = "Filtered job listings", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let outcome = state.listing_service.list(query.into_filter()).await?;
    Ok(Json(JobListResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Job posting found", body = Json<JobResponse>),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.listing_service.get(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = JobPostingPayload,
    responses(
        (status = 201, description = "Job posting created", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<JobPostingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.posting_service.create(&session, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    request_body = JobPostingPayload,
    responses(
        (status = 200, description = "Job posting replaced", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller does not own the posting"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JobPostingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.posting_service.update(&session, id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}
