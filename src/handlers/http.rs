//! HTTP handlers: service info and health.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::{AuthService, TokenCodec};

/// Shared application state. Built once at startup; every field is
/// immutable after construction and safe for concurrent reuse.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub token_codec: TokenCodec,
}

impl AppState {
    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }
    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }
}

/// GET / — service info.
pub async fn root() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "message": "Authgate API",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
