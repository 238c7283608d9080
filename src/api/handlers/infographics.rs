//! Infographic resource handlers.

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

use super::auth::{principal::require_admin, AuthConfig};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct InfographicRequest {
    pub title: String,
    pub image_path: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct InfographicResponse {
    pub id: i64,
    pub title: String,
    pub image_path: String,
}

#[utoipa::path(
    post,
    path = "/infographics",
    request_body = InfographicRequest,
    responses(
        (status = 201, description = "Infographic created", body = InfographicResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "infographics"
)]
pub async fn create_infographic(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<InfographicRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: InfographicRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match insert_infographic(&pool, &request).await {
        Ok(infographic) => (StatusCode::CREATED, Json(infographic)).into_response(),
        Err(err) => {
            error!("Failed to create infographic: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/infographics",
    responses(
        (status = 200, description = "List infographics", body = [InfographicResponse])
    ),
    tag = "infographics"
)]
pub async fn list_infographics(pool: Extension<PgPool>) -> impl IntoResponse {
    match fetch_infographics(&pool).await {
        Ok(infographics) => (StatusCode::OK, Json(infographics)).into_response(),
        Err(err) => {
            error!("Failed to list infographics: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/infographics/{infographic_id}",
    params(("infographic_id" = i64, Path, description = "Infographic id")),
    responses(
        (status = 200, description = "Infographic deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Infographic not found")
    ),
    tag = "infographics"
)]
pub async fn delete_infographic(
    Path(infographic_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match delete_infographic_record(&pool, infographic_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "message": "Infographic deleted" })),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            "Infographic not found".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to delete infographic: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn insert_infographic(
    pool: &PgPool,
    request: &InfographicRequest,
) -> Result<InfographicResponse, sqlx::Error> {
    let query = r"
        INSERT INTO infographics (title, image_path)
        VALUES ($1, $2)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&request.title)
        .bind(&request.image_path)
        .fetch_one(pool)
        .instrument(span)
        .await?;
    Ok(InfographicResponse {
        id: row.get("id"),
        title: request.title.clone(),
        image_path: request.image_path.clone(),
    })
}

async fn fetch_infographics(pool: &PgPool) -> Result<Vec<InfographicResponse>, sqlx::Error> {
    let query = "SELECT id, title, image_path FROM infographics ORDER BY id";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query).fetch_all(pool).instrument(span).await?;
    Ok(rows
        .into_iter()
        .map(|row| InfographicResponse {
            id: row.get("id"),
            title: row.get("title"),
            image_path: row.get("image_path"),
        })
        .collect())
}

async fn delete_infographic_record(
    pool: &PgPool,
    infographic_id: i64,
) -> Result<bool, sqlx::Error> {
    let query = "DELETE FROM infographics WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(infographic_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::InfographicRequest;
    use anyhow::Result;

    #[test]
    fn infographic_request_round_trips() -> Result<()> {
        let decoded: InfographicRequest = serde_json::from_str(
            r#"{"title": "Weaving Regions", "image_path": "/media/regions.png"}"#,
        )?;
        assert_eq!(decoded.title, "Weaving Regions");
        assert_eq!(decoded.image_path, "/media/regions.png");
        Ok(())
    }
}
