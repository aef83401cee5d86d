//! Quote requests: public submission plus the admin pipeline
//! (requested -> approved/rejected -> paid -> dispatched, cancellable while
//! still in flight).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::leads::snapshot_product;
use crate::listing::{self, ApiResponse, ListParams, ListResponse};
use crate::order_by;
use crate::shared::error::{ApiError, FieldError};
use crate::shared::schema::quote_requests;
use crate::shared::state::AppState;
use crate::shared::validate::Validator;

pub const STATUSES: &[&str] = &[
    "requested",
    "approved",
    "rejected",
    "paid",
    "dispatched",
    "cancelled",
];

/// Admin status moves. Terminal states accept nothing further.
pub fn is_valid_transition(from: &str, to: &str) -> bool {
    matches!(
        (from, to),
        ("requested", "approved" | "rejected" | "cancelled")
            | ("approved", "paid" | "cancelled")
            | ("paid", "dispatched" | "cancelled")
    )
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = quote_requests)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub id: Uuid,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub product_category: Option<String>,
    pub quantity: i32,
    pub unit: String,
    pub specifications: Option<String>,
    pub status: String,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub unit: Option<String>,
    pub specifications: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub status: String,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub product_category: Option<String>,
}

impl QuoteListQuery {
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
    "quantity",
    "status",
    "createdAt",
    "updatedAt",
];

fn filtered(q: &QuoteListQuery, params: &ListParams) -> quote_requests::BoxedQuery<'static, Pg> {
    let mut query = quote_requests::table.into_boxed();

    if let Some(value) = listing::exact(&q.status) {
        query = query.filter(quote_requests::status.eq(value));
    }
    if let Some(p) = listing::pattern(&q.product_category) {
        query = query.filter(quote_requests::product_category.ilike(p));
    }
    if let Some(search) = &params.search {
        let p = listing::like_pattern(search);
        query = query.filter(
            quote_requests::customer_name
                .ilike(p.clone())
                .or(quote_requests::email.ilike(p.clone()))
                .or(quote_requests::product_name.ilike(p)),
        );
    }

    query
}

pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQuoteRequest>,
) -> Result<Json<ApiResponse<QuoteRequest>>, ApiError> {
    let mut v = Validator::new();
    v.require("customerName", &req.customer_name)
        .require("email", &req.email)
        .email("email", &req.email)
        .require_some("quantity", &req.quantity);
    if let Some(qty) = req.quantity {
        v.positive("quantity", qty);
    }
    if req.product_id.is_none() {
        v.require("productName", req.product_name.as_deref().unwrap_or(""));
    }
    v.finish()?;

    let mut conn = state.conn.get()?;
    let snapshot = snapshot_product(&mut conn, req.product_id, req.product_name.as_deref())?;
    let now = Utc::now();

    let quote = QuoteRequest {
        id: Uuid::new_v4(),
        customer_name: req.customer_name.trim().to_string(),
        email: req.email.trim().to_string(),
        phone: req.phone,
        company: req.company,
        product_id: snapshot.product_id,
        product_name: snapshot.name,
        product_category: snapshot.category,
        quantity: req.quantity.unwrap_or(1),
        unit: req.unit.unwrap_or_else(|| "piece".to_string()),
        specifications: req.specifications,
        status: "requested".to_string(),
        admin_notes: None,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(quote_requests::table)
        .values(&quote)
        .execute(&mut conn)?;

    log::info!("quote request {} received from {}", quote.id, quote.email);

    Ok(Json(ApiResponse::new(quote)))
}

pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
    Query(q): Query<QuoteListQuery>,
) -> Result<Json<ListResponse<QuoteRequest>>, ApiError> {
    let params = q.params();
    let mut conn = state.conn.get()?;

    let total: i64 = filtered(&q, &params).count().get_result(&mut conn)?;

    let mut query = filtered(&q, &params);
    let (key, order) = params.sort(SORT_KEYS);
    query = match key {
        "customerName" => order_by!(query, order, quote_requests::customer_name),
        "productName" => order_by!(query, order, quote_requests::product_name),
        "quantity" => order_by!(query, order, quote_requests::quantity),
        "status" => order_by!(query, order, quote_requests::status),
        "updatedAt" => order_by!(query, order, quote_requests::updated_at),
        _ => order_by!(query, order, quote_requests::created_at),
    };

    let rows: Vec<QuoteRequest> = query
        .offset(params.offset())
        .limit(params.limit)
        .load(&mut conn)?;

    Ok(Json(ListResponse::new(rows, total, &params)))
}

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuoteRequest>>, ApiError> {
    let mut conn = state.conn.get()?;
    let quote: QuoteRequest = quote_requests::table
        .filter(quote_requests::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Quote request"))?;
    Ok(Json(ApiResponse::new(quote)))
}

pub async fn change_quote_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<QuoteRequest>>, ApiError> {
    if !STATUSES.contains(&req.status.as_str()) {
        return Err(ApiError::Validation(vec![FieldError::new(
            "status",
            "is not a recognized quote status",
        )]));
    }

    let mut conn = state.conn.get()?;
    let current: QuoteRequest = quote_requests::table
        .filter(quote_requests::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Quote request"))?;

    if !is_valid_transition(&current.status, &req.status) {
        return Err(ApiError::Conflict(format!(
            "Cannot move quote from {} to {}",
            current.status, req.status
        )));
    }

    let updated: QuoteRequest = diesel::update(quote_requests::table.filter(quote_requests::id.eq(id)))
        .set((
            quote_requests::status.eq(&req.status),
            quote_requests::admin_notes.eq(req.admin_notes.or(current.admin_notes)),
            quote_requests::updated_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    let affected = diesel::delete(quote_requests::table.filter(quote_requests::id.eq(id)))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::not_found("Quote request"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_quote_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/quotes", axum::routing::post(create_quote))
        .route("/api/admin/quotes", get(list_quotes))
        .route(
            "/api/admin/quotes/:id",
            get(get_quote).delete(delete_quote),
        )
        .route("/api/admin/quotes/:id/status", put(change_quote_status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        assert!(is_valid_transition("requested", "approved"));
        assert!(is_valid_transition("approved", "paid"));
        assert!(is_valid_transition("paid", "dispatched"));
    }

    #[test]
    fn rejection_and_cancellation() {
        assert!(is_valid_transition("requested", "rejected"));
        assert!(is_valid_transition("requested", "cancelled"));
        assert!(is_valid_transition("approved", "cancelled"));
        assert!(is_valid_transition("paid", "cancelled"));
    }

    #[test]
    fn terminal_states_are_final() {
        for to in STATUSES {
            assert!(!is_valid_transition("dispatched", to));
            assert!(!is_valid_transition("cancelled", to));
            assert!(!is_valid_transition("rejected", to));
        }
    }

    #[test]
    fn no_skipping_ahead() {
        assert!(!is_valid_transition("requested", "paid"));
        assert!(!is_valid_transition("requested", "dispatched"));
        assert!(!is_valid_transition("approved", "dispatched"));
    }
}
