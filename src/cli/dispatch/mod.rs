//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: auth_opts.token_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        frontend_origin: auth_opts.frontend_origin,
        seed_admin_email: auth_opts.seed_admin_email,
        seed_admin_password: auth_opts.seed_admin_password,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn token_secret_required() {
        temp_env::with_vars(
            [
                ("HABI_TOKEN_SECRET", None::<&str>),
                ("HABI_DSN", Some("postgres://user@localhost:5432/habi")),
            ],
            || {
                let command = crate::cli::commands::new();
                let result = command.try_get_matches_from(vec!["habi"]);
                assert_eq!(
                    result.map_err(|e| e.kind()),
                    Err(clap::error::ErrorKind::MissingRequiredArgument)
                );
            },
        );
    }

    #[test]
    fn server_action_carries_options() {
        temp_env::with_vars(
            [
                ("HABI_DSN", Some("postgres://user@localhost:5432/habi")),
                ("HABI_TOKEN_SECRET", Some("sekret")),
                ("HABI_TOKEN_TTL_SECONDS", Some("3600")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["habi"]);
                let action = handler(&matches).expect("handler should succeed");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/habi");
                assert_eq!(args.token_secret, "sekret");
                assert_eq!(args.token_ttl_seconds, 3600);
                assert_eq!(args.frontend_origin, "http://localhost:4000");
                assert_eq!(args.seed_admin_email, None);
            },
        );
    }
}
