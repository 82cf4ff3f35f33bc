use axum::{
    extract::{Extension, Multipart, State},
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::application_dto::ResumeFile,
    dto::profile_dto::{ProfileResponse, ResumeUploadResponse, UpdateProfilePayload},
    error::{Error, Result},
    models::user::Session,
    AppState,
};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let profile = state
        .store
        .get_profile(session.user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Profile not found".to_string()))?;
    Ok(Json(ProfileResponse::from(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state
        .account_service
        .update_profile(&session, payload)
        .await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// Multipart form with a single `resume` file part.
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut resume = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("resume") {
            let filename = field.file_name().unwrap_or("resume.pdf").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field.bytes().await?;
            if !data.is_empty() {
                resume = Some(ResumeFile {
                    filename,
                    content_type,
                    bytes: data,
                });
            }
        }
    }

    let resume_url = state
        .account_service
        .upload_resume(&session, resume)
        .await?;
    Ok(Json(ResumeUploadResponse { resume_url }))
}
