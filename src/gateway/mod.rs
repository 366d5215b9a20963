//! Identity gateway: the hosted provider that owns credentials, sessions,
//! and user storage. Everything behind this trait is external.

mod http;

pub use http::HttpIdentityGateway;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Structured failure modes of the provider.
///
/// Classification from provider status codes and message text happens inside
/// the client implementation; callers match on the kind, never on prose.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    DuplicateUser(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    NotFound(String),

    /// Transport failure or unparseable response from the provider.
    #[error("{0}")]
    Unavailable(String),

    /// Any other provider-reported error.
    #[error("{0}")]
    Provider(String),
}

/// User record as returned by the provider's auth endpoints.
#[derive(Debug, Clone)]
pub struct GatewayUser {
    pub id: String,
    pub email: String,
}

/// Result of sign-up, password sign-in, or session refresh.
///
/// `user` may be absent (e.g. a sign-up the provider silently rejected);
/// `refresh_token` may be absent when no session was issued.
#[derive(Debug, Clone, Default)]
pub struct AuthOutcome {
    pub user: Option<GatewayUser>,
    pub refresh_token: Option<String>,
}

/// Row from the provider-managed profile table. The provider creates it
/// asynchronously after sign-up, so a fresh user may have no row yet.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
    #[serde(default = "default_subscription")]
    pub subscription_status: String,
    pub created_at: String,
}

fn default_roles() -> Vec<String> {
    vec!["Consumer".to_string()]
}

fn default_subscription() -> String {
    "free".to_string()
}

/// Operations the facade needs from the hosted identity provider.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Create a user account with the provider.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthOutcome, GatewayError>;

    /// Verify credentials and open a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, GatewayError>;

    /// Exchange a refresh token for a new session. The provider may rotate
    /// the refresh token or return it unchanged.
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthOutcome, GatewayError>;

    /// End the provider-side session. Does not affect locally minted tokens.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Look up the profile row for a user; `None` when no row exists.
    async fn find_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, GatewayError>;

    /// Look up the auth-level user record (privileged channel) to obtain the
    /// canonical email.
    async fn find_auth_user(&self, user_id: &str) -> Result<GatewayUser, GatewayError>;
}
