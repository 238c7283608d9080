use anyhow::{Context, Result};
use clap::{Arg, Command};

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";
pub const ARG_SEED_ADMIN_EMAIL: &str = "seed-admin-email";
pub const ARG_SEED_ADMIN_PASSWORD: &str = "seed-admin-password";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Symmetric secret used to sign bearer tokens")
                .long_help(
                    "Symmetric secret used to sign bearer tokens (HS256). Rotating it invalidates all outstanding tokens.",
                )
                .env("HABI_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Bearer token TTL in seconds")
                .env("HABI_TOKEN_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_ORIGIN)
                .long(ARG_FRONTEND_ORIGIN)
                .help("Frontend origin allowed by CORS")
                .env("HABI_FRONTEND_ORIGIN")
                .default_value("http://localhost:4000"),
        )
        .arg(
            Arg::new(ARG_SEED_ADMIN_EMAIL)
                .long(ARG_SEED_ADMIN_EMAIL)
                .help("Email for the first-run admin account (seeding skipped when unset)")
                .env("HABI_SEED_ADMIN_EMAIL"),
        )
        .arg(
            Arg::new(ARG_SEED_ADMIN_PASSWORD)
                .long(ARG_SEED_ADMIN_PASSWORD)
                .help("Password for the first-run admin account")
                .env("HABI_SEED_ADMIN_PASSWORD")
                .hide_env_values(true)
                .requires(ARG_SEED_ADMIN_EMAIL),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: String,
    pub token_ttl_seconds: i64,
    pub frontend_origin: String,
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
}

impl Options {
    /// Collect auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --token-secret")?;
        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
            .copied()
            .unwrap_or(604_800);
        let frontend_origin = matches
            .get_one::<String>(ARG_FRONTEND_ORIGIN)
            .cloned()
            .unwrap_or_else(|| "http://localhost:4000".to_string());

        Ok(Self {
            token_secret,
            token_ttl_seconds,
            frontend_origin,
            seed_admin_email: matches.get_one::<String>(ARG_SEED_ADMIN_EMAIL).cloned(),
            seed_admin_password: matches.get_one::<String>(ARG_SEED_ADMIN_PASSWORD).cloned(),
        })
    }
}
