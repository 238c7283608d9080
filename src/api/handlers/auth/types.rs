//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub address: Option<String>,
    pub shipping_info: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub shipping_info: Option<String>,
    pub is_admin: bool,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user_id: i64,
    pub is_admin: bool,
}

impl LoginResponse {
    #[must_use]
    pub fn new(access_token: String, user_id: i64, is_admin: bool) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user_id,
            is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn register_request_round_trips() -> Result<()> {
        let request = RegisterRequest {
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            password: "pw123".to_string(),
            address: None,
            shipping_info: None,
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "alice@example.com");
        let decoded: RegisterRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.name, "Alice");
        assert_eq!(decoded.address, None);
        Ok(())
    }

    #[test]
    fn register_request_accepts_missing_optional_fields() -> Result<()> {
        let decoded: RegisterRequest = serde_json::from_str(
            r#"{"email": "bob@example.com", "name": "Bob", "password": "pw"}"#,
        )?;
        assert_eq!(decoded.shipping_info, None);
        Ok(())
    }

    #[test]
    fn login_response_defaults_token_type() {
        let response = LoginResponse::new("token".to_string(), 7, true);
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.user_id, 7);
        assert!(response.is_admin);
    }
}
