//! Auth HTTP handlers: register, login, refresh, logout, me.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::middleware::AuthUser;
use crate::models::{TokenResponse, UserResponse};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    /// Opaque; strength rules are the provider's.
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let response = state
        .auth_service()
        .register(&body.email, &body.password, body.display_name.as_deref())
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let response = state
        .auth_service()
        .login(&body.email, &body.password)
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = state
        .auth_service()
        .refresh_token(&body.refresh_token)
        .await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Ends the provider-side session only; locally minted access tokens stay
/// valid until they expire.
pub async fn logout(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.auth_service().logout().await?;
    Ok(Json(json!({ "message": "Successfully logged out" })))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let profile = state.auth_service().get_user_profile(&user_id).await?;
    Ok(Json(profile))
}
