//! Video resource handlers.

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
pub struct VideoRequest {
    pub title: String,
    pub description: String,
    pub filepath: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VideoResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub filepath: String,
}

#[utoipa::path(
    post,
    path = "/videos",
    request_body = VideoRequest,
    responses(
        (status = 201, description = "Video created", body = VideoResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "videos"
)]
pub async fn create_video(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<VideoRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: VideoRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match insert_video(&pool, &request).await {
        Ok(video) => (StatusCode::CREATED, Json(video)).into_response(),
        Err(err) => {
            error!("Failed to create video: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/videos",
    responses(
        (status = 200, description = "List videos", body = [VideoResponse])
    ),
    tag = "videos"
)]
pub async fn list_videos(pool: Extension<PgPool>) -> impl IntoResponse {
    match fetch_videos(&pool).await {
        Ok(videos) => (StatusCode::OK, Json(videos)).into_response(),
        Err(err) => {
            error!("Failed to list videos: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/videos/{video_id}",
    params(("video_id" = i64, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Video not found")
    ),
    tag = "videos"
)]
pub async fn delete_video(
    Path(video_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match delete_video_record(&pool, video_id).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "message": "Video deleted" }))).into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Video not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete video: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn insert_video(pool: &PgPool, request: &VideoRequest) -> Result<VideoResponse, sqlx::Error> {
    let query = r"
        INSERT INTO videos (title, description, filepath)
        VALUES ($1, $2, $3)
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
        .bind(&request.description)
        .bind(&request.filepath)
        .fetch_one(pool)
        .instrument(span)
        .await?;
    Ok(VideoResponse {
        id: row.get("id"),
        title: request.title.clone(),
        description: request.description.clone(),
        filepath: request.filepath.clone(),
    })
}

async fn fetch_videos(pool: &PgPool) -> Result<Vec<VideoResponse>, sqlx::Error> {
    let query = "SELECT id, title, description, filepath FROM videos ORDER BY id";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query).fetch_all(pool).instrument(span).await?;
    Ok(rows
        .into_iter()
        .map(|row| VideoResponse {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            filepath: row.get("filepath"),
        })
        .collect())
}

async fn delete_video_record(pool: &PgPool, video_id: i64) -> Result<bool, sqlx::Error> {
    let query = "DELETE FROM videos WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(video_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::VideoRequest;
    use anyhow::Result;

    #[test]
    fn video_request_round_trips() -> Result<()> {
        let decoded: VideoRequest = serde_json::from_str(
            r#"{"title": "Backstrap Weaving", "description": "Intro", "filepath": "/media/backstrap.mp4"}"#,
        )?;
        assert_eq!(decoded.title, "Backstrap Weaving");
        assert_eq!(decoded.filepath, "/media/backstrap.mp4");
        Ok(())
    }
}
