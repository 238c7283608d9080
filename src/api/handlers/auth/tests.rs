//! Properties of the auth seam: token issuance/validation and the role gate.

use anyhow::Result;
use secrecy::SecretString;

use super::{error::AuthError, state::AuthConfig, token};

fn test_config() -> AuthConfig {
    AuthConfig::new(
        SecretString::from("test-signing-secret".to_string()),
        "http://localhost:4000".to_string(),
    )
}

#[test]
fn issued_token_decodes_to_original_claims() -> Result<()> {
    let config = test_config();
    let issued = token::issue(&config, "a@x.com", 42, false)?;

    // Compact JWS: three base64url segments.
    assert_eq!(issued.split('.').count(), 3);

    let claims = token::decode(&config, &issued).expect("token should decode");
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.user_id, 42);
    assert!(!claims.is_admin);
    assert!(claims.exp > claims.iat);
    assert_eq!(claims.exp - claims.iat, config.token_ttl_seconds());
    Ok(())
}

#[test]
fn admin_flag_survives_round_trip() -> Result<()> {
    let config = test_config();
    let issued = token::issue(&config, "admin@x.com", 1, true)?;
    let claims = token::decode(&config, &issued).expect("token should decode");
    assert!(claims.is_admin);
    Ok(())
}

#[test]
fn expired_token_is_rejected() -> Result<()> {
    let config = test_config();
    let issued = token::issue_with_ttl(&config, "a@x.com", 42, false, -1)?;
    assert_eq!(token::decode(&config, &issued), Err(AuthError::InvalidToken));
    Ok(())
}

#[test]
fn token_signed_with_other_secret_is_rejected() -> Result<()> {
    let config = test_config();
    let other = AuthConfig::new(
        SecretString::from("some-other-secret".to_string()),
        "http://localhost:4000".to_string(),
    );
    let issued = token::issue(&other, "a@x.com", 42, false)?;
    assert_eq!(token::decode(&config, &issued), Err(AuthError::InvalidToken));
    Ok(())
}

#[test]
fn tampered_token_is_rejected() -> Result<()> {
    let config = test_config();
    let issued = token::issue(&config, "a@x.com", 42, false)?;

    // Flip a character in the payload segment; the signature no longer matches.
    let mut parts: Vec<String> = issued.split('.').map(str::to_string).collect();
    let mut payload: Vec<u8> = parts[1].clone().into_bytes();
    payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
    parts[1] = String::from_utf8(payload)?;
    let tampered = parts.join(".");

    assert_eq!(
        token::decode(&config, &tampered),
        Err(AuthError::InvalidToken)
    );
    Ok(())
}

#[test]
fn garbage_token_is_rejected() {
    let config = test_config();
    assert_eq!(
        token::decode(&config, "not-a-token"),
        Err(AuthError::InvalidToken)
    );
    assert_eq!(token::decode(&config, ""), Err(AuthError::InvalidToken));
}
