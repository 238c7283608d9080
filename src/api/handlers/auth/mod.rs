//! Auth handlers and supporting modules.
//!
//! This module coordinates password verification, bearer-token issuance, and
//! the per-request guards that protected endpoints use.
//!
//! ## Token lifecycle
//!
//! `Issued → Valid (until exp) → Expired`. There is no revocation list: a live
//! token can only be cut short by deleting the account (the guards re-resolve
//! the subject on every request) or by rotating the signing secret, which
//! invalidates every outstanding token at once.
//!
//! ## Guard behavior
//!
//! All token failures (bad signature, malformed structure, wrong algorithm,
//! past expiry, unknown subject) surface as one uniform `401`; a valid
//! identity without the admin flag gets `403`. Login failures never reveal
//! whether the email or the password was wrong.

pub(crate) mod error;
pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod principal;
pub(crate) mod register;
mod state;
pub(crate) mod storage;
pub(crate) mod token;
pub(crate) mod types;

pub use error::AuthError;
pub use principal::Principal;
pub use state::AuthConfig;

#[cfg(test)]
mod tests;
