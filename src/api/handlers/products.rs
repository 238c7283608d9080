//! Product catalog handlers.
//!
//! Deleting a product archives it instead of removing the row, so existing
//! order details keep pointing at real products. The public listing excludes
//! archived rows; `/products/all` shows everything and is admin-only.

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
pub struct ProductRequest {
    pub name: String,
    pub price: f64,
    pub status: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub status: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_archived: bool,
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "List available products", body = [ProductResponse])
    ),
    tag = "products"
)]
pub async fn list_products(pool: Extension<PgPool>) -> impl IntoResponse {
    match fetch_products(&pool, false).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(err) => {
            error!("Failed to list products: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/products/all",
    responses(
        (status = 200, description = "List all products including archived ones", body = [ProductResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "products"
)]
pub async fn list_all_products(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match fetch_products(&pool, true).await {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(err) => {
            error!("Failed to list all products: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "products"
)]
pub async fn create_product(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<ProductRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: ProductRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match insert_product(&pool, &request).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(err) => {
            error!("Failed to create product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/products/{product_id}",
    request_body = ProductRequest,
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn update_product(
    Path(product_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<ProductRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: ProductRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match update_product_record(&pool, product_id, &request).await {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Product not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to update product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product archived"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn archive_product(
    Path(product_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match archive_product_record(&pool, product_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "detail": "Product archived successfully" })),
        )
            .into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Product not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to archive product: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn fetch_products(
    pool: &PgPool,
    include_archived: bool,
) -> Result<Vec<ProductResponse>, sqlx::Error> {
    let query = if include_archived {
        "SELECT id, name, price, status, description, image, is_archived FROM products ORDER BY id"
    } else {
        "SELECT id, name, price, status, description, image, is_archived FROM products WHERE is_archived = FALSE ORDER BY id"
    };
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query).fetch_all(pool).instrument(span).await?;
    Ok(rows.into_iter().map(|row| product_from_row(&row)).collect())
}

async fn insert_product(
    pool: &PgPool,
    request: &ProductRequest,
) -> Result<ProductResponse, sqlx::Error> {
    let query = r"
        INSERT INTO products (name, price, status, description, image)
        VALUES ($1, $2, COALESCE($3, 'Available'), $4, $5)
        RETURNING id, name, price, status, description, image, is_archived
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&request.name)
        .bind(request.price)
        .bind(request.status.as_deref())
        .bind(request.description.as_deref())
        .bind(request.image.as_deref())
        .fetch_one(pool)
        .instrument(span)
        .await?;
    Ok(product_from_row(&row))
}

async fn update_product_record(
    pool: &PgPool,
    product_id: i64,
    request: &ProductRequest,
) -> Result<Option<ProductResponse>, sqlx::Error> {
    let query = r"
        UPDATE products
        SET name = $1,
            price = $2,
            status = COALESCE($3, status),
            description = $4,
            image = $5
        WHERE id = $6
        RETURNING id, name, price, status, description, image, is_archived
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&request.name)
        .bind(request.price)
        .bind(request.status.as_deref())
        .bind(request.description.as_deref())
        .bind(request.image.as_deref())
        .bind(product_id)
        .fetch_optional(pool)
        .instrument(span)
        .await?;
    Ok(row.map(|row| product_from_row(&row)))
}

async fn archive_product_record(pool: &PgPool, product_id: i64) -> Result<bool, sqlx::Error> {
    let query = r"
        UPDATE products
        SET is_archived = TRUE,
            status = 'Archived'
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(product_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

fn product_from_row(row: &sqlx::postgres::PgRow) -> ProductResponse {
    ProductResponse {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        status: row.get("status"),
        description: row.get("description"),
        image: row.get("image"),
        is_archived: row.get("is_archived"),
    }
}

#[cfg(test)]
mod tests {
    use super::ProductRequest;
    use anyhow::Result;

    #[test]
    fn product_request_accepts_minimal_payload() -> Result<()> {
        let decoded: ProductRequest =
            serde_json::from_str(r#"{"name": "Wall Hanging", "price": 595.0}"#)?;
        assert_eq!(decoded.name, "Wall Hanging");
        assert_eq!(decoded.status, None);
        assert_eq!(decoded.description, None);
        Ok(())
    }
}
