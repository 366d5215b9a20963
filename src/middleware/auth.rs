//! Bearer token extractor for routes behind local token verification.

use axum::http::header::AUTHORIZATION;

use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extractor: subject (provider user id) from a verified bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser(pub String);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix(BEARER_PREFIX))
            .ok_or_else(|| AppError::Auth("Invalid or expired token".to_string()))?;

        let claims = state
            .token_codec()
            .verify(token)
            .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))?;

        if claims.sub.is_empty() {
            return Err(AppError::Auth("Invalid token payload".to_string()));
        }
        Ok(AuthUser(claims.sub))
    }
}
