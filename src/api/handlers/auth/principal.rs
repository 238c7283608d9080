//! Authenticated principal extraction and authorization guards.
//!
//! Flow Overview: read the bearer token, decode it, re-resolve the subject in
//! the database, and return a principal whose admin flag reflects the stored
//! account rather than the token's cached claim. A deleted account or a
//! revoked admin flag therefore takes effect on the next request, not at
//! token expiry.

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use tracing::error;

use super::{error::AuthError, state::AuthConfig, storage, token};

/// Authenticated account context derived from a bearer token.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
}

/// Resolve the bearer token into a principal, or return the denial response.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
    config: &AuthConfig,
) -> Result<Principal, Response> {
    let Some(raw_token) = extract_bearer_token(headers) else {
        return Err(AuthError::InvalidToken.into_response());
    };

    let claims = match token::decode(config, &raw_token) {
        Ok(claims) => claims,
        Err(err) => return Err(err.into_response()),
    };

    // The account row is authoritative; an absent subject invalidates the token.
    match storage::fetch_account_by_email(pool, &claims.sub).await {
        Ok(Some(account)) => Ok(Principal {
            user_id: account.id,
            email: account.email,
            is_admin: account.is_admin,
        }),
        Ok(None) => Err(AuthError::InvalidToken.into_response()),
        Err(err) => {
            error!("Failed to resolve principal: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}

/// `require_auth` plus the admin gate.
pub(crate) async fn require_admin(
    headers: &HeaderMap,
    pool: &PgPool,
    config: &AuthConfig,
) -> Result<Principal, Response> {
    let principal = require_auth(headers, pool, config).await?;
    if let Err(err) = ensure_admin(&principal) {
        return Err(err.into_response());
    }
    Ok(principal)
}

/// Boolean role gate on a resolved principal.
pub(crate) fn ensure_admin(principal: &Principal) -> Result<(), AuthError> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{ensure_admin, extract_bearer_token, Principal};
    use crate::api::handlers::auth::error::AuthError;
    use axum::http::{HeaderMap, HeaderValue};

    fn principal(is_admin: bool) -> Principal {
        Principal {
            user_id: 1,
            email: "user@example.com".to_string(),
            is_admin,
        }
    }

    #[test]
    fn ensure_admin_gates_on_flag() {
        assert_eq!(ensure_admin(&principal(true)), Ok(()));
        assert_eq!(ensure_admin(&principal(false)), Err(AuthError::Forbidden));
    }

    #[test]
    fn extract_bearer_token_parses_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def".to_string()));
    }

    #[test]
    fn extract_bearer_token_accepts_lowercase_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("bearer abc"));
        assert_eq!(extract_bearer_token(&headers), Some("abc".to_string()));
    }

    #[test]
    fn extract_bearer_token_rejects_other_schemes_and_empty() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&headers), None);

        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
