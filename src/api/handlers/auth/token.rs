//! Bearer token issuance and validation.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::{error::AuthError, state::AuthConfig};

/// Claims carried by a bearer token.
///
/// `is_admin` is a snapshot taken at login; the guards re-resolve the stored
/// flag on every request, so it is informational for API clients only.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed token using the configured default TTL.
///
/// # Errors
/// Returns an error if signing fails.
pub(crate) fn issue(
    config: &AuthConfig,
    subject: &str,
    user_id: i64,
    is_admin: bool,
) -> Result<String> {
    issue_with_ttl(config, subject, user_id, is_admin, config.token_ttl_seconds())
}

/// Issue a signed token expiring `ttl_seconds` from now.
///
/// # Errors
/// Returns an error if signing fails.
pub(crate) fn issue_with_ttl(
    config: &AuthConfig,
    subject: &str,
    user_id: i64,
    is_admin: bool,
    ttl_seconds: i64,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        user_id,
        is_admin,
        iat: now,
        exp: now + ttl_seconds,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret().expose_secret().as_bytes()),
    )
    .context("Failed to issue bearer token")
}

/// Decode and validate a bearer token.
///
/// Signature mismatch, malformed structure, wrong algorithm, and past expiry
/// all map to [`AuthError::InvalidToken`]; callers cannot distinguish them.
pub(crate) fn decode(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is strict; the library default grants 60 seconds of leeway.
    validation.leeway = 0;

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.token_secret().expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}
