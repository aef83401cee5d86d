//! Custom-manufacturing requests: free-form production inquiries with
//! optional reference images. Deleting a request also purges those images
//! from the external host, best-effort.

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

use crate::listing::{self, ApiResponse, ListParams, ListResponse};
use crate::media;
use crate::order_by;
use crate::shared::error::{ApiError, FieldError};
use crate::shared::schema::custom_requests;
use crate::shared::state::AppState;
use crate::shared::utils::bd;
use crate::shared::validate::Validator;

pub const STATUSES: &[&str] = &[
    "received",
    "reviewing",
    "quoted",
    "accepted",
    "declined",
    "closed",
];

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = custom_requests)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequest {
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub specifications: String,
    pub quantity: i32,
    pub unit: String,
    pub target_price: Option<BigDecimal>,
    pub reference_images: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub category: Option<String>,
    pub specifications: String,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub target_price: Option<f64>,
    pub reference_images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
}

impl CustomListQuery {
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
    "category",
    "quantity",
    "status",
    "createdAt",
    "updatedAt",
];

fn filtered(q: &CustomListQuery, params: &ListParams) -> custom_requests::BoxedQuery<'static, Pg> {
    let mut query = custom_requests::table.into_boxed();

    if let Some(value) = listing::exact(&q.status) {
        query = query.filter(custom_requests::status.eq(value));
    }
    if let Some(p) = listing::pattern(&q.category) {
        query = query.filter(custom_requests::category.ilike(p));
    }
    if let Some(search) = &params.search {
        let p = listing::like_pattern(search);
        query = query.filter(
            custom_requests::customer_name
                .ilike(p.clone())
                .or(custom_requests::email.ilike(p.clone()))
                .or(custom_requests::specifications.ilike(p)),
        );
    }

    query
}

pub async fn create_custom_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCustomRequest>,
) -> Result<Json<ApiResponse<CustomRequest>>, ApiError> {
    let mut v = Validator::new();
    v.require("customerName", &req.customer_name)
        .require("email", &req.email)
        .email("email", &req.email)
        .require("specifications", &req.specifications)
        .require_some("quantity", &req.quantity);
    if let Some(qty) = req.quantity {
        v.positive("quantity", qty);
    }
    v.finish()?;

    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let record = CustomRequest {
        id: Uuid::new_v4(),
        customer_name: req.customer_name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: req.phone,
        company: req.company,
        category: req.category,
        specifications: req.specifications.trim().to_string(),
        quantity: req.quantity.unwrap_or(1),
        unit: req.unit.unwrap_or_else(|| "piece".to_string()),
        target_price: req.target_price.map(bd),
        reference_images: req.reference_images.unwrap_or_default(),
        status: "received".to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(custom_requests::table)
        .values(&record)
        .execute(&mut conn)?;

    log::info!(
        "custom manufacturing request {} received from {}",
        record.id,
        record.email
    );

    Ok(Json(ApiResponse::new(record)))
}

pub async fn list_custom_requests(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CustomListQuery>,
) -> Result<Json<ListResponse<CustomRequest>>, ApiError> {
    let params = q.params();
    let mut conn = state.conn.get()?;

    let total: i64 = filtered(&q, &params).count().get_result(&mut conn)?;

    let mut query = filtered(&q, &params);
    let (key, order) = params.sort(SORT_KEYS);
    query = match key {
        "customerName" => order_by!(query, order, custom_requests::customer_name),
        "category" => order_by!(query, order, custom_requests::category),
        "quantity" => order_by!(query, order, custom_requests::quantity),
        "status" => order_by!(query, order, custom_requests::status),
        "updatedAt" => order_by!(query, order, custom_requests::updated_at),
        _ => order_by!(query, order, custom_requests::created_at),
    };

    let rows: Vec<CustomRequest> = query
        .offset(params.offset())
        .limit(params.limit)
        .load(&mut conn)?;

    Ok(Json(ListResponse::new(rows, total, &params)))
}

pub async fn get_custom_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CustomRequest>>, ApiError> {
    let mut conn = state.conn.get()?;
    let record: CustomRequest = custom_requests::table
        .filter(custom_requests::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Custom request"))?;
    Ok(Json(ApiResponse::new(record)))
}

pub async fn change_custom_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<CustomRequest>>, ApiError> {
    if !STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::Validation(vec![FieldError::new(
            "status",
            "is not a recognized request status",
        )]));
    }

    let mut conn = state.conn.get()?;
    let updated: CustomRequest =
        diesel::update(custom_requests::table.filter(custom_requests::id.eq(id)))
            .set((
                custom_requests::status.eq(&req.status),
                custom_requests::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Custom request"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_custom_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let images = {
        let mut conn = state.conn.get()?;
        let record: CustomRequest = custom_requests::table
            .filter(custom_requests::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Custom request"))?;
        diesel::delete(custom_requests::table.filter(custom_requests::id.eq(id)))
            .execute(&mut conn)?;
        record.reference_images
    };

    media::purge(state.images.as_ref(), &images).await;

    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_custom_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/custom-requests", post(create_custom_request))
        .route("/api/admin/custom-requests", get(list_custom_requests))
        .route(
            "/api/admin/custom-requests/:id",
            get(get_custom_request).delete(delete_custom_request),
        )
        .route(
            "/api/admin/custom-requests/:id/status",
            put(change_custom_status),
        )
}
