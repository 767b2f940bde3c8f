use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::types::{BearerToken, Claims, LoginRequest, LoginResponse, RegisterRequest};
use crate::shared::{AppError, AppState};
use crate::user::models::PublicUser;

/// POST /api/user/register
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    state.auth_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /api/user/login
///
/// Returns the fresh bearer token and the sanitized user record
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.auth_service.login(request).await?;

    info!(user_id = %response.user.id, "Login handler completed");
    Ok(Json(response))
}

/// POST /api/user/logout (behind the auth gate)
///
/// Revokes exactly the token the request was authenticated with
#[instrument(name = "logout", skip(state, token))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<Value>, AppError> {
    state.auth_service.logout(&claims.sub, &token).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// GET /api/user/me (behind the auth gate)
#[instrument(name = "me", skip(state))]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .user_repository
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("No user found".to_string()))?;

    Ok(Json(user.into()))
}
