use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{
        ChangePasswordPayload, LoginPayload, LoginResponse, MeResponse, RegisterPayload,
        RegisterResponse, ResetPasswordPayload, SessionTokensResponse, UserResponse,
    },
    error::Result,
    models::user::Session,
    AppState,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let outcome = state.account_service.register(payload).await?;
    let response = RegisterResponse {
        user_id: outcome.user_id,
        email: outcome.email,
        confirmation_required: outcome.session.is_none(),
        session: outcome.session.map(SessionTokensResponse::from),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (authenticated, user) = state.account_service.login(payload).await?;
    let response = LoginResponse {
        access_token: authenticated.tokens.access_token,
        refresh_token: authenticated.tokens.refresh_token,
        expires_in: authenticated.tokens.expires_in,
        user: user.map(UserResponse::from),
    };
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    state.account_service.logout(&session).await?;
    Ok(Json(json!({ "message": "Signed out" })))
}

/// Always answers the same way so the endpoint cannot be used to probe for
/// registered addresses.
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.account_service.reset_password(payload).await?;
    Ok(Json(json!({
        "message": "If the address is registered, a recovery email is on its way"
    })))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .account_service
        .change_password(&session, payload)
        .await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<impl IntoResponse> {
    let overview = state.account_service.me(&session).await?;
    let response = MeResponse {
        user_id: session.user_id,
        email: session.email,
        full_name: overview.user.as_ref().map(|user| user.full_name.clone()),
        role: overview.user.map(|user| user.role),
        profile: overview.profile.map(Into::into),
    };
    Ok(Json(response))
}
