//! Admin-only user management.
//!
//! Unlike `/register`, these endpoints may grant the admin role, so every one
//! of them sits behind the admin guard. Password changes go through the same
//! Argon2id hashing as registration; plaintext never reaches a query.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{error, Instrument};
use utoipa::ToSchema;

use super::auth::{
    password,
    principal::require_admin,
    storage::{insert_account, is_unique_violation, NewAccount, SignupOutcome},
    types::UserResponse,
    AuthConfig,
};
use super::valid_email;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub address: Option<String>,
    pub shipping_info: Option<String>,
    pub is_admin: Option<bool>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub shipping_info: Option<String>,
    pub is_admin: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "List all users", body = [UserResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "users"
)]
pub async fn list_users(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match fetch_users(&pool).await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(err) => {
            error!("Failed to list users: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = String),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "users"
)]
pub async fn create_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<CreateUserRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: CreateUserRequest = match payload {
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
    let is_admin = request.is_admin.unwrap_or(false);
    let account = NewAccount {
        email: &email,
        name: &name,
        address: request.address.as_deref(),
        shipping_info: request.shipping_info.as_deref(),
        is_admin,
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
                is_admin,
            }),
        )
            .into_response(),
        Ok(SignupOutcome::Conflict) => (
            StatusCode::BAD_REQUEST,
            "Email already registered".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to create user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/users/{user_id}",
    request_body = UpdateUserRequest,
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = String),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_user(
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<UpdateUserRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: UpdateUserRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if let Some(email) = request.email.as_deref() {
        if !valid_email(email.trim()) {
            return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
        }
    }

    // An absent password leaves the stored hash untouched; an empty one is a
    // caller mistake, not a request to clear it.
    let hashed_password = match request.password.as_deref() {
        None => None,
        Some("") => {
            return (
                StatusCode::BAD_REQUEST,
                "Password must not be empty".to_string(),
            )
                .into_response()
        }
        Some(password) => match password::hash(password) {
            Ok(hash) => Some(hash),
            Err(err) => {
                error!("Failed to hash password: {err}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
    };

    match update_user_record(&pool, user_id, &request, hashed_password.as_deref()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "User not found".to_string()).into_response(),
        Err(err) if is_unique_violation(&err) => (
            StatusCode::BAD_REQUEST,
            "Email already registered".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to update user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Admins cannot delete their own account", body = String),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn delete_user(
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let admin = match require_admin(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    if admin.user_id == user_id {
        return (
            StatusCode::BAD_REQUEST,
            "Cannot delete your own admin account".to_string(),
        )
            .into_response();
    }

    match delete_user_record(&pool, user_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "detail": format!("User with ID {user_id} deleted") })),
        )
            .into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "User not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn fetch_users(pool: &PgPool) -> Result<Vec<UserResponse>, sqlx::Error> {
    let query = r"
        SELECT id, email, name, address, shipping_info, is_admin
        FROM users
        ORDER BY id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query).fetch_all(pool).instrument(span).await?;
    Ok(rows.into_iter().map(|row| user_from_row(&row)).collect())
}

async fn update_user_record(
    pool: &PgPool,
    user_id: i64,
    request: &UpdateUserRequest,
    hashed_password: Option<&str>,
) -> Result<Option<UserResponse>, sqlx::Error> {
    let query = r"
        UPDATE users
        SET email = COALESCE($1, email),
            name = COALESCE($2, name),
            address = COALESCE($3, address),
            shipping_info = COALESCE($4, shipping_info),
            is_admin = COALESCE($5, is_admin),
            hashed_password = COALESCE($6, hashed_password)
        WHERE id = $7
        RETURNING id, email, name, address, shipping_info, is_admin
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(request.email.as_deref().map(str::trim))
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.address.as_deref())
        .bind(request.shipping_info.as_deref())
        .bind(request.is_admin)
        .bind(hashed_password)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await?;
    Ok(row.map(|row| user_from_row(&row)))
}

async fn delete_user_record(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let query = "DELETE FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserResponse {
    UserResponse {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        address: row.get("address"),
        shipping_info: row.get("shipping_info"),
        is_admin: row.get("is_admin"),
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateUserRequest, UpdateUserRequest};
    use anyhow::Result;

    #[test]
    fn create_request_defaults_admin_flag_to_absent() -> Result<()> {
        let decoded: CreateUserRequest = serde_json::from_str(
            r#"{"email": "carol@example.com", "name": "Carol", "password": "pw"}"#,
        )?;
        assert_eq!(decoded.is_admin, None);
        Ok(())
    }

    #[test]
    fn update_request_supports_partial_payloads() -> Result<()> {
        let decoded: UpdateUserRequest = serde_json::from_str(r#"{"name": "New Name"}"#)?;
        assert_eq!(decoded.name.as_deref(), Some("New Name"));
        assert_eq!(decoded.email, None);
        assert_eq!(decoded.password, None);
        assert_eq!(decoded.is_admin, None);
        Ok(())
    }
}
