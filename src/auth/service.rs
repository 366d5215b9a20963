//! Auth orchestrator: register, login, refresh, logout, profile fetch.
//!
//! Stateless per request: each use case is a short sequence of gateway
//! round trips plus local token minting. Gateway failures are remapped to
//! the local error taxonomy here and never cross the HTTP boundary raw.

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::error::{AppError, AppResult};
use crate::gateway::{AuthOutcome, GatewayError, IdentityGateway};
use crate::models::{TokenResponse, UserResponse};

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn IdentityGateway>,
    codec: TokenCodec,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn IdentityGateway>, codec: TokenCodec) -> Self {
        Self { gateway, codec }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AppResult<TokenResponse> {
        let outcome = match self.gateway.sign_up(email, password, display_name).await {
            Ok(outcome) => outcome,
            Err(GatewayError::DuplicateUser(_)) => {
                return Err(AppError::UserAlreadyExists(
                    "User with this email already exists".to_string(),
                ))
            }
            Err(e) => return Err(AppError::Auth(format!("Registration failed: {}", e))),
        };
        // No user in a successful response means the account was not created,
        // which the provider only does for an existing email.
        let user_id = outcome.user.as_ref().map(|u| u.id.clone()).ok_or_else(|| {
            AppError::UserAlreadyExists("Failed to create user account".to_string())
        })?;
        // The provider creates the profile row asynchronously; a profile
        // fetch racing this registration may briefly miss.
        self.token_response(&user_id, email, outcome)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenResponse> {
        let outcome = match self.gateway.sign_in_with_password(email, password).await {
            Ok(outcome) => outcome,
            Err(GatewayError::InvalidCredentials(_)) => {
                return Err(AppError::Auth("Invalid email or password".to_string()))
            }
            Err(e) => return Err(AppError::Auth(format!("Login failed: {}", e))),
        };
        let user_id = outcome
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;
        self.token_response(&user_id, email, outcome)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let outcome = self
            .gateway
            .refresh_session(refresh_token)
            .await
            .map_err(|e| AppError::Auth(format!("Token refresh failed: {}", e)))?;
        let (user_id, email) = outcome
            .user
            .as_ref()
            .map(|u| (u.id.clone(), u.email.clone()))
            .ok_or_else(|| AppError::Auth("Invalid refresh token".to_string()))?;
        self.token_response(&user_id, &email, outcome)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.gateway
            .sign_out()
            .await
            .map_err(|e| AppError::Auth(format!("Logout failed: {}", e)))
    }

    pub async fn get_user_profile(&self, user_id: &str) -> AppResult<UserResponse> {
        let profile = match self.gateway.find_profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return Err(AppError::UserNotFound("User not found".to_string())),
            Err(e) => return Err(profile_error(e)),
        };
        let auth_user = self
            .gateway
            .find_auth_user(user_id)
            .await
            .map_err(profile_error)?;

        Ok(UserResponse {
            user_id: profile.user_id,
            email: auth_user.email,
            display_name: profile.display_name,
            roles: profile.roles,
            subscription_status: profile.subscription_status,
            created_at: profile.created_at,
        })
    }

    /// Mint an access token for the user and wrap it with the provider's
    /// refresh token, passed through verbatim ("" when no session exists).
    fn token_response(
        &self,
        user_id: &str,
        email: &str,
        outcome: AuthOutcome,
    ) -> AppResult<TokenResponse> {
        let access_token = self.codec.issue(user_id, email)?;
        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.codec.ttl_seconds(),
            refresh_token: outcome.refresh_token.unwrap_or_default(),
        })
    }
}

/// Transport failures during profile fetch are surfaced as upstream
/// unavailability, not conflated with "not found".
fn profile_error(e: GatewayError) -> AppError {
    match e {
        GatewayError::Unavailable(msg) => AppError::Upstream(msg),
        other => AppError::UserNotFound(format!("Failed to get user profile: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Algorithm;
    use crate::gateway::{GatewayUser, ProfileRow};
    use async_trait::async_trait;

    type Handler<T> = fn() -> Result<T, GatewayError>;

    /// Fake gateway: each method delegates to an optional fn pointer and
    /// panics when a test exercises an unconfigured path.
    #[derive(Default)]
    struct FakeGateway {
        sign_up: Option<Handler<AuthOutcome>>,
        sign_in: Option<Handler<AuthOutcome>>,
        refresh: Option<Handler<AuthOutcome>>,
        sign_out: Option<Handler<()>>,
        profile: Option<Handler<Option<ProfileRow>>>,
        auth_user: Option<Handler<GatewayUser>>,
    }

    #[async_trait]
    impl IdentityGateway for FakeGateway {
        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            _display_name: Option<&str>,
        ) -> Result<AuthOutcome, GatewayError> {
            self.sign_up.expect("sign_up not configured")()
        }

        async fn sign_in_with_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<AuthOutcome, GatewayError> {
            self.sign_in.expect("sign_in not configured")()
        }

        async fn refresh_session(&self, _token: &str) -> Result<AuthOutcome, GatewayError> {
            self.refresh.expect("refresh not configured")()
        }

        async fn sign_out(&self) -> Result<(), GatewayError> {
            self.sign_out.expect("sign_out not configured")()
        }

        async fn find_profile(&self, _id: &str) -> Result<Option<ProfileRow>, GatewayError> {
            self.profile.expect("profile not configured")()
        }

        async fn find_auth_user(&self, _id: &str) -> Result<GatewayUser, GatewayError> {
            self.auth_user.expect("auth_user not configured")()
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(
            "test-secret-at-least-32-chars!!!".to_string(),
            Algorithm::HS256,
            30,
        )
    }

    fn service(gateway: FakeGateway) -> AuthService {
        AuthService::new(Arc::new(gateway), codec())
    }

    fn user_outcome() -> Result<AuthOutcome, GatewayError> {
        Ok(AuthOutcome {
            user: Some(GatewayUser {
                id: "u1".to_string(),
                email: "a@b.com".to_string(),
            }),
            refresh_token: Some("provider-refresh".to_string()),
        })
    }

    #[tokio::test]
    async fn register_mints_verifiable_token() {
        let svc = service(FakeGateway {
            sign_up: Some(user_outcome),
            ..Default::default()
        });
        let res = svc.register("a@b.com", "pw", None).await.unwrap();
        assert_eq!(res.token_type, "bearer");
        assert_eq!(res.expires_in, 30 * 60);
        assert_eq!(res.refresh_token, "provider-refresh");
        let claims = codec().verify(&res.access_token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@b.com");
    }

    #[tokio::test]
    async fn register_duplicate_maps_to_user_already_exists() {
        let svc = service(FakeGateway {
            sign_up: Some(|| {
                Err(GatewayError::DuplicateUser(
                    "A user with this email address has already been registered".to_string(),
                ))
            }),
            ..Default::default()
        });
        let err = svc.register("a@b.com", "pw", None).await.unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists(_)));
    }

    #[tokio::test]
    async fn register_without_user_maps_to_user_already_exists() {
        let svc = service(FakeGateway {
            sign_up: Some(|| Ok(AuthOutcome::default())),
            ..Default::default()
        });
        let err = svc.register("a@b.com", "pw", None).await.unwrap_err();
        assert!(matches!(err, AppError::UserAlreadyExists(_)));
    }

    #[tokio::test]
    async fn register_other_gateway_error_maps_to_auth() {
        let svc = service(FakeGateway {
            sign_up: Some(|| Err(GatewayError::Provider("rate limited".to_string()))),
            ..Default::default()
        });
        let err = svc.register("a@b.com", "pw", None).await.unwrap_err();
        match err {
            AppError::Auth(msg) => assert!(msg.contains("rate limited")),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_invalid_credentials_message_is_fixed() {
        let svc = service(FakeGateway {
            sign_in: Some(|| {
                Err(GatewayError::InvalidCredentials(
                    "Invalid login credentials".to_string(),
                ))
            }),
            ..Default::default()
        });
        let err = svc.login("a@b.com", "bad").await.unwrap_err();
        match err {
            AppError::Auth(msg) => assert_eq!(msg, "Invalid email or password"),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_without_user_is_invalid_credentials() {
        let svc = service(FakeGateway {
            sign_in: Some(|| Ok(AuthOutcome::default())),
            ..Default::default()
        });
        let err = svc.login("a@b.com", "pw").await.unwrap_err();
        match err {
            AppError::Auth(msg) => assert_eq!(msg, "Invalid email or password"),
            other => panic!("expected Auth, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn refresh_passes_rotated_token_through() {
        let svc = service(FakeGateway {
            refresh: Some(|| {
                Ok(AuthOutcome {
                    user: Some(GatewayUser {
                        id: "u1".to_string(),
                        email: "a@b.com".to_string(),
                    }),
                    refresh_token: Some("rotated".to_string()),
                })
            }),
            ..Default::default()
        });
        let res = svc.refresh_token("old").await.unwrap();
        assert_eq!(res.refresh_token, "rotated");
        let claims = codec().verify(&res.access_token).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[tokio::test]
    async fn refresh_failure_maps_to_auth() {
        let svc = service(FakeGateway {
            refresh: Some(|| Err(GatewayError::Provider("refresh_token invalid".to_string()))),
            ..Default::default()
        });
        let err = svc.refresh_token("old").await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn logout_maps_gateway_error_to_auth() {
        let svc = service(FakeGateway {
            sign_out: Some(|| Err(GatewayError::Provider("session gone".to_string()))),
            ..Default::default()
        });
        assert!(matches!(svc.logout().await, Err(AppError::Auth(_))));
    }

    #[tokio::test]
    async fn profile_empty_result_is_not_found() {
        let svc = service(FakeGateway {
            profile: Some(|| Ok(None)),
            ..Default::default()
        });
        let err = svc.get_user_profile("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn profile_transport_failure_is_upstream_not_not_found() {
        let svc = service(FakeGateway {
            profile: Some(|| Err(GatewayError::Unavailable("connection refused".to_string()))),
            ..Default::default()
        });
        let err = svc.get_user_profile("u1").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn profile_composes_row_with_canonical_email() {
        let svc = service(FakeGateway {
            profile: Some(|| {
                Ok(Some(ProfileRow {
                    user_id: "u1".to_string(),
                    display_name: Some("Ada".to_string()),
                    roles: vec!["Consumer".to_string()],
                    subscription_status: "free".to_string(),
                    created_at: "2026-01-01T00:00:00Z".to_string(),
                }))
            }),
            auth_user: Some(|| {
                Ok(GatewayUser {
                    id: "u1".to_string(),
                    email: "canonical@b.com".to_string(),
                })
            }),
            ..Default::default()
        });
        let profile = svc.get_user_profile("u1").await.unwrap();
        assert_eq!(profile.email, "canonical@b.com");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.roles, vec!["Consumer".to_string()]);
    }
}
