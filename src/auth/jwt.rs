//! Access token issue and verification.

use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jsonwebtoken::Algorithm;

/// Claims carried by a locally minted access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Provider user id. Defaulted on decode so a missing subject can be
    /// reported distinctly from an invalid token.
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Uniform verification failure. Callers learn nothing about which
/// sub-check (signature, structure, expiry) rejected the token.
#[derive(Debug, Error)]
#[error("invalid token")]
pub struct InvalidToken;

/// Mints and verifies signed, time-bounded access tokens.
///
/// Tokens are self-contained: verification is signature plus expiry only,
/// with no revocation list. A token issued before logout stays valid for
/// its full TTL.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: String, algorithm: Algorithm, ttl_minutes: i64) -> Self {
        Self {
            secret,
            algorithm,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, subject: &str, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let token = encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token encode: {}", e)))?;
        Ok(token)
    }

    /// Fails closed: signature mismatch, malformed structure, and expiry all
    /// collapse into the same `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        // A token is valid strictly until its expiry instant.
        validation.leeway = 0;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| InvalidToken)?;
        Ok(data.claims)
    }
}
