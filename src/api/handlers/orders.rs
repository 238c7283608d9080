//! Order and order-detail handlers.
//!
//! Order creation is deliberately unauthenticated: the checkout flow posts an
//! order before the customer ever logs in. Everything that reads or mutates
//! existing orders is admin-only. Detail rows are removed together with their
//! order.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{error, Instrument};
use utoipa::ToSchema;

use super::auth::{principal::require_admin, AuthConfig};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OrderRequest {
    pub customer_id: i64,
    pub customer_name: String,
    pub shipping_id: i64,
    pub status: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OrderResponse {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub shipping_id: i64,
    pub status: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OrderDetailRequest {
    pub product_id: i64,
    pub product_name: String,
    pub unit_cost: f64,
    pub quantity: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OrderDetailResponse {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub unit_cost: f64,
    pub quantity: i64,
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    pool: Extension<PgPool>,
    payload: Option<Json<OrderRequest>>,
) -> impl IntoResponse {
    let request: OrderRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match insert_order(&pool, &request).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(err) => {
            error!("Failed to create order: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "List orders", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "orders"
)]
pub async fn list_orders(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match fetch_orders(&pool).await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(err) => {
            error!("Failed to list orders: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/orders/{order_id}",
    request_body = OrderRequest,
    params(("order_id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn update_order(
    Path(order_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<OrderRequest>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    let request: OrderRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match update_order_record(&pool, order_id, &request).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Order not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to update order: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{order_id}",
    params(("order_id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn delete_order(
    Path(order_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match delete_order_record(&pool, order_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Order not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete order: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/orders/{order_id}/details",
    request_body = OrderDetailRequest,
    params(("order_id" = i64, Path, description = "Order id")),
    responses(
        (status = 201, description = "Order detail added", body = OrderDetailResponse),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn add_order_detail(
    Path(order_id): Path<i64>,
    pool: Extension<PgPool>,
    payload: Option<Json<OrderDetailRequest>>,
) -> impl IntoResponse {
    let request: OrderDetailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    match insert_order_detail(&pool, order_id, &request).await {
        Ok(Some(detail)) => (StatusCode::CREATED, Json(detail)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Order not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to add order detail: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/orders/{order_id}/details",
    params(("order_id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "List details for an order", body = [OrderDetailResponse])
    ),
    tag = "orders"
)]
pub async fn list_order_details(
    Path(order_id): Path<i64>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    match fetch_order_details(&pool, order_id).await {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(err) => {
            error!("Failed to list order details: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn insert_order(pool: &PgPool, request: &OrderRequest) -> Result<OrderResponse, sqlx::Error> {
    let query = r"
        INSERT INTO orders (customer_id, customer_name, shipping_id, status)
        VALUES ($1, $2, $3, COALESCE($4, 'Pending'))
        RETURNING id, customer_id, customer_name, shipping_id, status
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(request.customer_id)
        .bind(&request.customer_name)
        .bind(request.shipping_id)
        .bind(request.status.as_deref())
        .fetch_one(pool)
        .instrument(span)
        .await?;
    Ok(order_from_row(&row))
}

async fn fetch_orders(pool: &PgPool) -> Result<Vec<OrderResponse>, sqlx::Error> {
    let query = r"
        SELECT id, customer_id, customer_name, shipping_id, status
        FROM orders
        ORDER BY id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query).fetch_all(pool).instrument(span).await?;
    Ok(rows.into_iter().map(|row| order_from_row(&row)).collect())
}

async fn update_order_record(
    pool: &PgPool,
    order_id: i64,
    request: &OrderRequest,
) -> Result<Option<OrderResponse>, sqlx::Error> {
    let query = r"
        UPDATE orders
        SET customer_id = $1,
            customer_name = $2,
            shipping_id = $3,
            status = COALESCE($4, status)
        WHERE id = $5
        RETURNING id, customer_id, customer_name, shipping_id, status
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(request.customer_id)
        .bind(&request.customer_name)
        .bind(request.shipping_id)
        .bind(request.status.as_deref())
        .bind(order_id)
        .fetch_optional(pool)
        .instrument(span)
        .await?;
    Ok(row.map(|row| order_from_row(&row)))
}

async fn delete_order_record(pool: &PgPool, order_id: i64) -> Result<bool, sqlx::Error> {
    // Detail rows go with the order via ON DELETE CASCADE.
    let query = "DELETE FROM orders WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(order_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

async fn insert_order_detail(
    pool: &PgPool,
    order_id: i64,
    request: &OrderDetailRequest,
) -> Result<Option<OrderDetailResponse>, sqlx::Error> {
    // The path id is authoritative; any order id in the payload is ignored.
    let query = r"
        INSERT INTO order_details (order_id, product_id, product_name, unit_cost, quantity)
        SELECT $1, $2, $3, $4, $5
        WHERE EXISTS (SELECT 1 FROM orders WHERE id = $1)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(order_id)
        .bind(request.product_id)
        .bind(&request.product_name)
        .bind(request.unit_cost)
        .bind(request.quantity)
        .fetch_optional(pool)
        .instrument(span)
        .await?;
    Ok(row.map(|row| OrderDetailResponse {
        id: row.get("id"),
        order_id,
        product_id: request.product_id,
        product_name: request.product_name.clone(),
        unit_cost: request.unit_cost,
        quantity: request.quantity,
    }))
}

async fn fetch_order_details(
    pool: &PgPool,
    order_id: i64,
) -> Result<Vec<OrderDetailResponse>, sqlx::Error> {
    let query = r"
        SELECT id, order_id, product_id, product_name, unit_cost, quantity
        FROM order_details
        WHERE order_id = $1
        ORDER BY id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(order_id)
        .fetch_all(pool)
        .instrument(span)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| OrderDetailResponse {
            id: row.get("id"),
            order_id: row.get("order_id"),
            product_id: row.get("product_id"),
            product_name: row.get("product_name"),
            unit_cost: row.get("unit_cost"),
            quantity: row.get("quantity"),
        })
        .collect())
}

fn order_from_row(row: &sqlx::postgres::PgRow) -> OrderResponse {
    OrderResponse {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        customer_name: row.get("customer_name"),
        shipping_id: row.get("shipping_id"),
        status: row.get("status"),
    }
}

#[cfg(test)]
mod tests {
    use super::{OrderDetailRequest, OrderRequest};
    use anyhow::Result;

    #[test]
    fn order_request_defaults_status_to_absent() -> Result<()> {
        let decoded: OrderRequest = serde_json::from_str(
            r#"{"customer_id": 1, "customer_name": "Alice", "shipping_id": 2}"#,
        )?;
        assert_eq!(decoded.status, None);
        Ok(())
    }

    #[test]
    fn order_detail_request_ignores_body_order_id() -> Result<()> {
        // The path parameter wins; a stray order_id in the payload is dropped.
        let decoded: OrderDetailRequest = serde_json::from_str(
            r#"{"order_id": 99, "product_id": 5, "product_name": "Scarf", "unit_cost": 3600.0, "quantity": 1}"#,
        )?;
        assert_eq!(decoded.product_id, 5);
        assert_eq!(decoded.quantity, 1);
        Ok(())
    }
}
