use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use tracing::error;

use super::super::valid_email;
use super::{
    password,
    storage::{insert_account, NewAccount, SignupOutcome},
    types::{RegisterRequest, UserResponse},
};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    pool: Extension<PgPool>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = request.email.trim().to_string();
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if request.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Password must not be empty".to_string(),
        )
            .into_response();
    }

    let hashed_password = match password::hash(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let name = request.name.trim().to_string();
    // Self-registration never grants the admin role.
    let account = NewAccount {
        email: &email,
        name: &name,
        address: request.address.as_deref(),
        shipping_info: request.shipping_info.as_deref(),
        is_admin: false,
        hashed_password: &hashed_password,
    };

    match insert_account(&pool, &account).await {
        Ok(SignupOutcome::Created(id)) => (
            StatusCode::CREATED,
            Json(UserResponse {
                id,
                email,
                name,
                address: request.address,
                shipping_info: request.shipping_info,
                is_admin: false,
            }),
        )
            .into_response(),
        Ok(SignupOutcome::Conflict) => (
            StatusCode::BAD_REQUEST,
            "Email already registered".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Registration failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
