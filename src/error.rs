use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed on {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Storage collaborator error: {0}")]
    Collaborator(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": reason, "field": field }),
            ),
            Error::Conflict { reason } => (StatusCode::CONFLICT, json!({ "error": reason })),
            Error::Collaborator(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "An unexpected error occurred" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Collaborator(format!("External service error: {}", err))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, reason) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, field_errors)| {
                let reason = field_errors
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .unwrap_or_else(|| "invalid".to_string());
                (field.to_string(), reason)
            })
            .unwrap_or_else(|| ("payload".to_string(), "invalid".to_string()));
        Error::Validation { field, reason }
    }
}
