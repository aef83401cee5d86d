//! Sample requests with the shipping-fee payment sub-flow.
//!
//! Submission persists the request as `awaiting_payment` and hands back
//! transfer instructions from the payment seam. The customer confirms with a
//! transfer id; ids carrying the provider's test marker settle to `pending`
//! instead of `paid` so rehearsal payments never look like money.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::leads::snapshot_product;
use crate::listing::{self, ApiResponse, ListParams, ListResponse};
use crate::order_by;
use crate::payments::TransferInstructions;
use crate::shared::error::{ApiError, FieldError};
use crate::shared::schema::sample_requests;
use crate::shared::state::AppState;
use crate::shared::utils::{bd, bd_to_f64};
use crate::shared::validate::Validator;
use crate::shipping;

pub const STATUSES: &[&str] = &[
    "awaiting_payment",
    "pending",
    "paid",
    "dispatched",
    "cancelled",
];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = sample_requests)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequest {
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub product_category: Option<String>,
    pub quantity: i32,
    pub address_line: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub shipping_fee: BigDecimal,
    pub currency: String,
    pub transfer_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSampleRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub product_id: Uuid,
    pub quantity: Option<i32>,
    pub address_line: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSubmission {
    pub request: SampleRequest,
    pub payment: TransferInstructions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub transfer_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub country: Option<String>,
}

impl SampleListQuery {
    fn params(&self) -> ListParams {
        ListParams::from_raw(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.search.as_deref(),
        )
    }
}

const SORT_KEYS: &[&str] = &[
    "customerName",
    "productName",
    "country",
    "status",
    "shippingFee",
    "createdAt",
    "updatedAt",
];

fn filtered(q: &SampleListQuery, params: &ListParams) -> sample_requests::BoxedQuery<'static, Pg> {
    let mut query = sample_requests::table.into_boxed();

    if let Some(value) = listing::exact(&q.status) {
        query = query.filter(sample_requests::status.eq(value));
    }
    if let Some(value) = listing::exact(&q.country) {
        query = query.filter(sample_requests::country.eq(value));
    }
    if let Some(search) = &params.search {
        let p = listing::like_pattern(search);
        query = query.filter(
            sample_requests::customer_name
                .ilike(p.clone())
                .or(sample_requests::email.ilike(p.clone()))
                .or(sample_requests::product_name.ilike(p)),
        );
    }

    query
}

/// Step one of the payment sub-flow: persist and return instructions.
pub async fn create_sample(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSampleRequest>,
) -> Result<Json<ApiResponse<SampleSubmission>>, ApiError> {
    let mut v = Validator::new();
    v.require("customerName", &req.customer_name)
        .require("email", &req.email)
        .email("email", &req.email)
        .require("addressLine", &req.address_line)
        .require("city", &req.city)
        .require("postalCode", &req.postal_code)
        .require("country", &req.country);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let snapshot = snapshot_product(&mut conn, Some(req.product_id), None)?;

    let country = req.country.trim().to_uppercase();
    let fee = shipping::fee_for(&country);
    let now = Utc::now();

    let sample = SampleRequest {
        id: Uuid::new_v4(),
        customer_name: req.customer_name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: req.phone,
        company: req.company,
        product_id: snapshot.product_id,
        product_name: snapshot.name,
        product_category: snapshot.category,
        quantity: req.quantity.unwrap_or(1).max(1),
        address_line: req.address_line.trim().to_string(),
        city: req.city.trim().to_string(),
        postal_code: req.postal_code.trim().to_string(),
        country,
        shipping_fee: bd(fee),
        currency: shipping::DEFAULT_CURRENCY.to_string(),
        transfer_id: None,
        status: "awaiting_payment".to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(sample_requests::table)
        .values(&sample)
        .execute(&mut conn)?;

    let reference = format!("SMP-{}", sample.id.simple());
    let payment = state
        .payments
        .instructions(bd_to_f64(&sample.shipping_fee), &sample.currency, &reference);

    log::info!(
        "sample request {} awaiting payment of {} {}",
        sample.id,
        fee,
        sample.currency
    );

    Ok(Json(ApiResponse::new(SampleSubmission {
        request: sample,
        payment,
    })))
}

/// Step two: the customer reports the transfer they made.
pub async fn confirm_sample_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<ApiResponse<SampleRequest>>, ApiError> {
    let mut v = Validator::new();
    v.require("transferId", &req.transfer_id);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let current: SampleRequest = sample_requests::table
        .filter(sample_requests::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Sample request"))?;

    if current.status != "awaiting_payment" {
        return Err(ApiError::Conflict(format!(
            "Sample request is already {}",
            current.status
        )));
    }

    let transfer_id = req.transfer_id.trim().to_string();
    let status = if state.payments.is_test_transfer(&transfer_id) {
        "pending"
    } else {
        "paid"
    };

    let updated: SampleRequest =
        diesel::update(sample_requests::table.filter(sample_requests::id.eq(id)))
            .set((
                sample_requests::transfer_id.eq(Some(transfer_id)),
                sample_requests::status.eq(status),
                sample_requests::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn list_samples(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SampleListQuery>,
) -> Result<Json<ListResponse<SampleRequest>>, ApiError> {
    let params = q.params();
    let mut conn = state.conn.get()?;

    let total: i64 = filtered(&q, &params).count().get_result(&mut conn)?;

    let mut query = filtered(&q, &params);
    let (key, order) = params.sort(SORT_KEYS);
    query = match key {
        "customerName" => order_by!(query, order, sample_requests::customer_name),
        "productName" => order_by!(query, order, sample_requests::product_name),
        "country" => order_by!(query, order, sample_requests::country),
        "status" => order_by!(query, order, sample_requests::status),
        "shippingFee" => order_by!(query, order, sample_requests::shipping_fee),
        "updatedAt" => order_by!(query, order, sample_requests::updated_at),
        _ => order_by!(query, order, sample_requests::created_at),
    };

    let rows: Vec<SampleRequest> = query
        .offset(params.offset())
        .limit(params.limit)
        .load(&mut conn)?;

    Ok(Json(ListResponse::new(rows, total, &params)))
}

pub async fn get_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SampleRequest>>, ApiError> {
    let mut conn = state.conn.get()?;
    let sample: SampleRequest = sample_requests::table
        .filter(sample_requests::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Sample request"))?;
    Ok(Json(ApiResponse::new(sample)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: String,
}

pub async fn change_sample_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<SampleRequest>>, ApiError> {
    if !STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::Validation(vec![FieldError::new(
            "status",
            "is not a recognized sample status",
        )]));
    }

    let mut conn = state.conn.get()?;
    let updated: SampleRequest =
        diesel::update(sample_requests::table.filter(sample_requests::id.eq(id)))
            .set((
                sample_requests::status.eq(&req.status),
                sample_requests::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Sample request"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    let affected = diesel::delete(sample_requests::table.filter(sample_requests::id.eq(id)))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::not_found("Sample request"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_sample_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/samples", post(create_sample))
        .route("/api/samples/:id/confirm", post(confirm_sample_payment))
        .route("/api/admin/samples", get(list_samples))
        .route(
            "/api/admin/samples/:id",
            get(get_sample).delete(delete_sample),
        )
        .route("/api/admin/samples/:id/status", put(change_sample_status))
}
