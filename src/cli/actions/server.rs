use crate::api::{self, handlers::auth::AuthConfig, seed::SeedAdmin};
use anyhow::Result;
use secrecy::SecretString;

pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: String,
    pub token_ttl_seconds: i64,
    pub frontend_origin: String,
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn)
            .field("token_secret", &"***")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("frontend_origin", &self.frontend_origin)
            .field("seed_admin_email", &self.seed_admin_email)
            .field("seed_admin_password", &"***")
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new(
        SecretString::from(args.token_secret),
        args.frontend_origin,
    )
    .with_token_ttl_seconds(args.token_ttl_seconds);

    let seed_admin = match (args.seed_admin_email, args.seed_admin_password) {
        (Some(email), Some(password)) => Some(SeedAdmin {
            email,
            password: SecretString::from(password),
        }),
        _ => None,
    };

    api::new(args.port, args.dsn, auth_config, seed_admin).await
}

#[cfg(test)]
mod tests {
    use super::Args;

    #[test]
    fn debug_redacts_secrets() {
        let args = Args {
            port: 8080,
            dsn: "postgres://localhost".to_string(),
            token_secret: "super-secret".to_string(),
            token_ttl_seconds: 60,
            frontend_origin: "http://localhost:4000".to_string(),
            seed_admin_email: Some("admin@habi.dev".to_string()),
            seed_admin_password: Some("adminpass".to_string()),
        };
        let rendered = format!("{args:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("adminpass"));
        assert!(rendered.contains("admin@habi.dev"));
    }
}
