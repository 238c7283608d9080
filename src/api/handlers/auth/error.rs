//! Error taxonomy for the auth seam.

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures surfaced by the authentication and authorization guards.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Login failed. Unknown email and wrong password are reported identically.
    #[error("Incorrect email or password")]
    InvalidCredentials,
    /// Token rejected. Signature, structure, algorithm, expiry, and unknown
    /// subject failures are reported identically.
    #[error("Could not validate credentials")]
    InvalidToken,
    /// Valid identity without the admin role.
    #[error("Operation requires admin privileges")]
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, "Bearer")],
                self.to_string(),
            )
                .into_response(),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AuthError;
    use axum::{
        http::{header::WWW_AUTHENTICATE, StatusCode},
        response::IntoResponse,
    };

    #[test]
    fn unauthorized_variants_carry_bearer_challenge() {
        for error in [AuthError::InvalidCredentials, AuthError::InvalidToken] {
            let response = error.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|value| value.to_str().ok()),
                Some("Bearer")
            );
        }
    }

    #[test]
    fn forbidden_maps_to_403_without_challenge() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());
    }
}
