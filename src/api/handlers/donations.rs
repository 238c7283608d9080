//! Donation handlers.
//!
//! A donation and the campaign totals it affects (`collected_amount`,
//! `supporters`) change inside one transaction, both on create and on delete,
//! so the totals never drift from the donation rows under concurrent requests.

use anyhow::Context;
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

use super::auth::{
    principal::{require_admin, require_auth},
    AuthConfig,
};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DonationRequest {
    pub campaign_id: i64,
    pub amount: f64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DonationResponse {
    pub id: i64,
    pub campaign_id: i64,
    pub customer_id: i64,
    pub amount: f64,
}

#[derive(Debug)]
enum DonationOutcome {
    Created(DonationResponse),
    CampaignNotFound,
}

#[utoipa::path(
    post,
    path = "/donation",
    request_body = DonationRequest,
    responses(
        (status = 201, description = "Donation recorded", body = DonationResponse),
        (status = 400, description = "Donation amount must be positive", body = String),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Campaign not found")
    ),
    tag = "donation"
)]
pub async fn create_donation(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
    payload: Option<Json<DonationRequest>>,
) -> impl IntoResponse {
    // Any logged-in account can donate; the donor id comes from the token,
    // never from the payload.
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    let request: DonationRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if request.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            "Donation amount must be positive".to_string(),
        )
            .into_response();
    }

    match insert_donation(&pool, principal.user_id, &request).await {
        Ok(DonationOutcome::Created(donation)) => {
            (StatusCode::CREATED, Json(donation)).into_response()
        }
        Ok(DonationOutcome::CampaignNotFound) => (
            StatusCode::NOT_FOUND,
            "Fundraising campaign not found".to_string(),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to record donation: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/donation",
    responses(
        (status = 200, description = "List all donations", body = [DonationResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "donation"
)]
pub async fn list_donations(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match fetch_donations(&pool, None).await {
        Ok(donations) => (StatusCode::OK, Json(donations)).into_response(),
        Err(err) => {
            error!("Failed to list donations: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/donation/user/me",
    responses(
        (status = 200, description = "List the caller's donations", body = [DonationResponse]),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    tag = "donation"
)]
pub async fn list_my_donations(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool, &auth_config).await {
        Ok(principal) => principal,
        Err(response) => return response,
    };

    match fetch_donations(&pool, Some(principal.user_id)).await {
        Ok(donations) => (StatusCode::OK, Json(donations)).into_response(),
        Err(err) => {
            error!("Failed to list donations: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/donation/{donation_id}",
    params(("donation_id" = i64, Path, description = "Donation id")),
    responses(
        (status = 204, description = "Donation deleted and campaign totals reversed"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Donation not found")
    ),
    tag = "donation"
)]
pub async fn delete_donation(
    Path(donation_id): Path<i64>,
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_config: Extension<Arc<AuthConfig>>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&headers, &pool, &auth_config).await {
        return response;
    }

    match delete_donation_record(&pool, donation_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Donation not found".to_string()).into_response(),
        Err(err) => {
            error!("Failed to delete donation: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn insert_donation(
    pool: &PgPool,
    customer_id: i64,
    request: &DonationRequest,
) -> anyhow::Result<DonationOutcome> {
    let mut tx = pool.begin().await.context("begin donation transaction")?;

    // Locking the campaign row keeps concurrent donations from losing updates.
    let query = "SELECT id FROM campaigns WHERE id = $1 FOR UPDATE";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let campaign = sqlx::query(query)
        .bind(request.campaign_id)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to lookup campaign")?;

    if campaign.is_none() {
        tx.rollback().await.context("rollback donation")?;
        return Ok(DonationOutcome::CampaignNotFound);
    }

    let query = r"
        INSERT INTO donations (campaign_id, customer_id, amount)
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
        .bind(request.campaign_id)
        .bind(customer_id)
        .bind(request.amount)
        .fetch_one(&mut *tx)
        .instrument(span)
        .await
        .context("failed to insert donation")?;

    let query = r"
        UPDATE campaigns
        SET collected_amount = collected_amount + $1,
            supporters = supporters + 1
        WHERE id = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(request.amount)
        .bind(request.campaign_id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to update campaign totals")?;

    tx.commit().await.context("commit donation transaction")?;

    Ok(DonationOutcome::Created(DonationResponse {
        id: row.get("id"),
        campaign_id: request.campaign_id,
        customer_id,
        amount: request.amount,
    }))
}

async fn fetch_donations(
    pool: &PgPool,
    customer_id: Option<i64>,
) -> Result<Vec<DonationResponse>, sqlx::Error> {
    let query = match customer_id {
        Some(_) => {
            "SELECT id, campaign_id, customer_id, amount FROM donations WHERE customer_id = $1 ORDER BY id"
        }
        None => "SELECT id, campaign_id, customer_id, amount FROM donations ORDER BY id",
    };
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let mut statement = sqlx::query(query);
    if let Some(customer_id) = customer_id {
        statement = statement.bind(customer_id);
    }
    let rows = statement.fetch_all(pool).instrument(span).await?;
    Ok(rows
        .into_iter()
        .map(|row| DonationResponse {
            id: row.get("id"),
            campaign_id: row.get("campaign_id"),
            customer_id: row.get("customer_id"),
            amount: row.get("amount"),
        })
        .collect())
}

async fn delete_donation_record(pool: &PgPool, donation_id: i64) -> anyhow::Result<bool> {
    let mut tx = pool.begin().await.context("begin delete transaction")?;

    let query = "DELETE FROM donations WHERE id = $1 RETURNING campaign_id, amount";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(donation_id)
        .fetch_optional(&mut *tx)
        .instrument(span)
        .await
        .context("failed to delete donation")?;

    let Some(row) = row else {
        tx.rollback().await.context("rollback delete")?;
        return Ok(false);
    };

    let campaign_id: i64 = row.get("campaign_id");
    let amount: f64 = row.get("amount");

    // Reversal clamps at zero so a manually-edited campaign can never go negative.
    let query = r"
        UPDATE campaigns
        SET collected_amount = GREATEST(collected_amount - $1, 0),
            supporters = GREATEST(supporters - 1, 0)
        WHERE id = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(amount)
        .bind(campaign_id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to reverse campaign totals")?;

    tx.commit().await.context("commit delete transaction")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{DonationOutcome, DonationRequest, DonationResponse};
    use anyhow::Result;

    #[test]
    fn donation_request_round_trips() -> Result<()> {
        let decoded: DonationRequest =
            serde_json::from_str(r#"{"campaign_id": 3, "amount": 500.0}"#)?;
        assert_eq!(decoded.campaign_id, 3);
        assert!(decoded.amount > 0.0);
        Ok(())
    }

    #[test]
    fn donation_outcome_debug_names() {
        let outcome = DonationOutcome::Created(DonationResponse {
            id: 1,
            campaign_id: 2,
            customer_id: 3,
            amount: 4.0,
        });
        assert!(format!("{outcome:?}").starts_with("Created"));
        assert_eq!(
            format!("{:?}", DonationOutcome::CampaignNotFound),
            "CampaignNotFound"
        );
    }
}
