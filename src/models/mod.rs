//! Response models shared by the orchestrator and the HTTP boundary.

use serde::{Deserialize, Serialize};

/// Token pair returned by register, login, and refresh.
///
/// The access token is minted locally; the refresh token is an opaque string
/// owned by the identity provider and passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Empty string when the provider returned no session.
    pub refresh_token: String,
}

/// User profile as composed from the provider's profile row and auth record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub roles: Vec<String>,
    pub subscription_status: String,
    pub created_at: String,
}
