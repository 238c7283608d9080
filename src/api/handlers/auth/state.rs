//! Auth configuration.
//!
//! One immutable value built at startup and injected into handlers through an
//! axum `Extension`; nothing in the auth seam reads ambient global state.

use secrecy::SecretString;

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    token_secret: SecretString,
    token_ttl_seconds: i64,
    frontend_origin: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_secret: SecretString, frontend_origin: String) -> Self {
        Self {
            token_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            frontend_origin,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    pub(crate) fn token_secret(&self) -> &SecretString {
        &self.token_secret
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn frontend_origin(&self) -> &str {
        &self.frontend_origin
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("frontend_origin", &self.frontend_origin)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthConfig, DEFAULT_TOKEN_TTL_SECONDS};
    use secrecy::SecretString;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(
            SecretString::from("sekret".to_string()),
            "http://localhost:4000".to_string(),
        );

        assert_eq!(config.token_ttl_seconds(), DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.frontend_origin(), "http://localhost:4000");

        let config = config.with_token_ttl_seconds(1800);
        assert_eq!(config.token_ttl_seconds(), 1800);
    }

    #[test]
    fn debug_redacts_token_secret() {
        let config = AuthConfig::new(
            SecretString::from("super-secret".to_string()),
            "http://localhost:4000".to_string(),
        );
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}
