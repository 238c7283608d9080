//! # Habi (Marketplace & Fundraising Backend)
//!
//! `habi` is the backend for a weaving-community marketplace. It manages user
//! accounts with a two-role model (customer, admin), a product catalog,
//! fundraising campaigns with donation tracking, orders with their line items,
//! and media resources (videos, infographics).
//!
//! ## Authentication
//!
//! Passwords are hashed with **Argon2id**; only the PHC-format hash is stored.
//! Logging in returns a **bearer token** (JWT, HS256) carrying the account
//! email, id, and admin flag. The signing secret, algorithm, and default TTL
//! live in an immutable [`api::handlers::auth::AuthConfig`] built once at
//! startup from CLI/env input and injected into handlers; nothing reads
//! ambient global state.
//!
//! ## Authorization
//!
//! Protected endpoints re-resolve the token subject against the database on
//! every request and use the *stored* admin flag, so account deletion or a
//! role change takes effect immediately rather than at token expiry. A valid
//! identity without the admin flag gets `403 Forbidden` on admin routes;
//! every token problem (bad signature, malformed structure, expiry, unknown
//! subject) is reported uniformly as `401 Unauthorized`.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
