//! reqwest-based client for the hosted identity provider's REST surface.

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{AuthOutcome, GatewayError, GatewayUser, IdentityGateway, ProfileRow};

/// HTTP client for the provider. Built once at startup and shared by
/// reference; holds no per-request state.
#[derive(Clone)]
pub struct HttpIdentityGateway {
    client: Client,
    base_url: String,
    publishable_key: String,
    secret_key: String,
}

impl HttpIdentityGateway {
    pub fn new(
        base_url: &str,
        publishable_key: String,
        secret_key: String,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            publishable_key,
            secret_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Classify a provider error response into a structured kind. This is
    /// the only place provider message text is inspected.
    async fn classify_error(response: Response) -> GatewayError {
        let status = response.status();
        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get("msg")
                .or_else(|| body.get("message"))
                .or_else(|| body.get("error_description"))
                .and_then(Value::as_str)
                .unwrap_or("unknown provider error")
                .to_string(),
            Err(e) => return GatewayError::Unavailable(e.to_string()),
        };
        debug!(%status, %message, "provider error response");

        if message.contains("already been registered") || message.contains("already registered") {
            return GatewayError::DuplicateUser(message);
        }
        if message.contains("Invalid login credentials") {
            return GatewayError::InvalidCredentials(message);
        }
        if status == StatusCode::NOT_FOUND {
            return GatewayError::NotFound(message);
        }
        GatewayError::Provider(message)
    }

    async fn auth_outcome(response: Response) -> Result<AuthOutcome, GatewayError> {
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        let session: SessionPayload = response.json().await?;
        Ok(session.into_outcome())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Unavailable(e.to_string())
    }
}

/// Session payload from sign-up, token grant, and refresh endpoints.
/// Sign-up with confirmation pending returns the bare user fields instead
/// of a session, so both shapes are accepted.
#[derive(Debug, Deserialize)]
struct SessionPayload {
    user: Option<UserPayload>,
    refresh_token: Option<String>,
    id: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl SessionPayload {
    fn into_outcome(self) -> AuthOutcome {
        let user = match (self.user, self.id) {
            (Some(u), _) => Some(GatewayUser {
                id: u.id,
                email: u.email.unwrap_or_default(),
            }),
            (None, Some(id)) => Some(GatewayUser {
                id,
                email: self.email.unwrap_or_default(),
            }),
            (None, None) => None,
        };
        AuthOutcome {
            user,
            refresh_token: self.refresh_token,
        }
    }
}

#[async_trait::async_trait]
impl IdentityGateway for HttpIdentityGateway {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthOutcome, GatewayError> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(name) = display_name {
            body["data"] = json!({ "display_name": name });
        }
        let response = self
            .client
            .post(self.url("/auth/v1/signup"))
            .header("apikey", &self.publishable_key)
            .json(&body)
            .send()
            .await?;
        Self::auth_outcome(response).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, GatewayError> {
        let response = self
            .client
            .post(self.url("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.publishable_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::auth_outcome(response).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthOutcome, GatewayError> {
        let response = self
            .client
            .post(self.url("/auth/v1/token?grant_type=refresh_token"))
            .header("apikey", &self.publishable_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        Self::auth_outcome(response).await
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url("/auth/v1/logout"))
            .header("apikey", &self.publishable_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        Ok(())
    }

    async fn find_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, GatewayError> {
        let response = self
            .client
            .get(self.url("/rest/v1/user_profiles"))
            .query(&[("user_id", format!("eq.{}", user_id)), ("select", "*".to_string())])
            .header("apikey", &self.publishable_key)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        let mut rows: Vec<ProfileRow> = response.json().await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    async fn find_auth_user(&self, user_id: &str) -> Result<GatewayUser, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/auth/v1/admin/users/{}", user_id)))
            .header("apikey", &self.secret_key)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        let user: UserPayload = response.json().await?;
        Ok(GatewayUser {
            email: user.email.unwrap_or_default(),
            id: user.id,
        })
    }
}
