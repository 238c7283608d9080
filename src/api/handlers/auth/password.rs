//! Password hashing and verification.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id.
///
/// The PHC-format output embeds the salt and cost parameters, so verification
/// needs no side channel.
///
/// # Errors
/// Returns an error for empty input or if hashing fails.
pub(crate) fn hash(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(anyhow!("password must not be empty"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// A malformed hash verifies as `false` rather than erroring; callers must
/// treat both cases as a failed login.
#[must_use]
pub(crate) fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::{hash, verify};
    use anyhow::Result;

    #[test]
    fn hash_and_verify_round_trip() -> Result<()> {
        let password = "my-secure-password";
        let hashed = hash(password)?;
        assert!(verify(password, &hashed));
        Ok(())
    }

    #[test]
    fn verify_rejects_wrong_password() -> Result<()> {
        let hashed = hash("correct-password")?;
        assert!(!verify("wrong-password", &hashed));
        Ok(())
    }

    #[test]
    fn hashes_differ_per_call_but_both_verify() -> Result<()> {
        let password = "same-password";
        let first = hash(password)?;
        let second = hash(password)?;
        assert_ne!(first, second);
        assert!(verify(password, &first));
        assert!(verify(password, &second));
        Ok(())
    }

    #[test]
    fn verify_returns_false_for_malformed_hash() {
        assert!(!verify("whatever", "not-a-phc-hash"));
        assert!(!verify("whatever", ""));
    }

    #[test]
    fn hash_rejects_empty_input() {
        assert!(hash("").is_err());
    }
}
