use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    error::AuthError,
    password,
    state::AuthConfig,
    storage::fetch_account_by_email,
    token,
    types::{LoginRequest, LoginResponse},
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Incorrect email or password", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let account = match fetch_account_by_email(&pool, request.email.trim()).await {
        Ok(account) => account,
        Err(err) => {
            error!("Login lookup failed: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // Unknown email and wrong password are indistinguishable to the caller.
    let Some(account) = account else {
        return AuthError::InvalidCredentials.into_response();
    };

    if !password::verify(&request.password, &account.hashed_password) {
        return AuthError::InvalidCredentials.into_response();
    }

    match token::issue(&auth_config, &account.email, account.id, account.is_admin) {
        Ok(access_token) => (
            StatusCode::OK,
            Json(LoginResponse::new(access_token, account.id, account.is_admin)),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to issue bearer token: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
