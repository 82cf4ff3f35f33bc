use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::application_dto::{ApplicationResponse, ApplyForm, ReceivedListResponse, ResumeFile},
    error::Result,
    models::user::Session,
    AppState,
};

/// Multipart form: `name`, `email`, optional `phone` and `cover_letter`
/// text fields, plus a `resume` file part.
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut form = ApplyForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = field.text().await.unwrap_or_default(),
            "email" => form.email = field.text().await.unwrap_or_default(),
            "phone" => form.phone = Some(field.text().await.unwrap_or_default()),
            "cover_letter" => form.cover_letter = Some(field.text().await.unwrap_or_default()),
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    form.resume = Some(ResumeFile {
                        filename,
                        content_type,
                        bytes: data,
                    });
                }
            }
            _ => {}
        }
    }

    let record = state
        .application_service
        .submit(&session, job_id, form)
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(record))))
}

/// Applications to every posting owned by the caller, newest first.
pub async fn received_applications(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let items = state.application_service.received(&session).await?;
    Ok(Json(ReceivedListResponse {
        items: items.into_iter().map(Into::into).collect(),
    }))
}
