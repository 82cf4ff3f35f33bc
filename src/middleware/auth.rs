use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::Error;
use crate::models::user::Session;
use crate::AppState;

/// Resolves the bearer token against the auth collaborator and threads the
/// resulting [`Session`] through as a request extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    match state.store.current_identity(token).await {
        Ok(identity) => {
            let session = Session {
                access_token: token.to_string(),
                user_id: identity.user_id,
                email: identity.email,
            };
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(Error::Unauthorized(message)) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": message})),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
