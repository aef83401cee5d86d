//! Raw leather hides: the second catalog variant. Same list pipeline and
//! image handling as finished products, with hide-specific attributes
//! (animal, finish, surface area) and the negotiable-pricing flag.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::{split_images, PriceTier};
use crate::listing::{self, ApiResponse, ListParams, ListResponse};
use crate::media;
use crate::shared::error::{ApiError, FieldError};
use crate::shared::schema::raw_leather;
use crate::shared::state::AppState;
use crate::shared::utils::bd;
use crate::shared::validate::Validator;
use crate::{array_ilike, order_by};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = raw_leather)]
#[serde(rename_all = "camelCase")]
pub struct RawLeather {
    pub id: Uuid,
    pub name: String,
    pub leather_type: String,
    pub animal: String,
    pub finish: Option<String>,
    pub origin: Option<String>,
    pub size_sqft: Option<BigDecimal>,
    pub thickness_mm: Option<BigDecimal>,
    pub colors: Vec<String>,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub currency: String,
    pub unit: String,
    pub price_tiers: serde_json::Value,
    pub availability: String,
    pub is_featured: bool,
    pub is_archived: bool,
    pub is_active: bool,
    pub negotiable: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRawLeatherRequest {
    pub name: String,
    pub leather_type: String,
    pub animal: String,
    pub finish: Option<String>,
    pub origin: Option<String>,
    pub size_sqft: Option<f64>,
    pub thickness_mm: Option<f64>,
    pub colors: Option<Vec<String>>,
    pub description: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
    pub unit: Option<String>,
    pub price_tiers: Option<Vec<PriceTier>>,
    pub availability: Option<String>,
    pub is_featured: Option<bool>,
    pub negotiable: Option<bool>,
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRawLeatherRequest {
    pub name: Option<String>,
    pub leather_type: Option<String>,
    pub animal: Option<String>,
    pub finish: Option<String>,
    pub origin: Option<String>,
    pub size_sqft: Option<f64>,
    pub thickness_mm: Option<f64>,
    pub colors: Option<Vec<String>>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub unit: Option<String>,
    pub price_tiers: Option<Vec<PriceTier>>,
    pub availability: Option<String>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_active: Option<bool>,
    pub negotiable: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = raw_leather)]
struct RawLeatherChangeset {
    name: Option<String>,
    leather_type: Option<String>,
    animal: Option<String>,
    finish: Option<String>,
    origin: Option<String>,
    size_sqft: Option<BigDecimal>,
    thickness_mm: Option<BigDecimal>,
    colors: Option<Vec<String>>,
    description: Option<String>,
    price: Option<BigDecimal>,
    currency: Option<String>,
    unit: Option<String>,
    price_tiers: Option<serde_json::Value>,
    availability: Option<String>,
    is_featured: Option<bool>,
    is_archived: Option<bool>,
    is_active: Option<bool>,
    negotiable: Option<bool>,
    images: Option<Vec<String>>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveImagesRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeatherListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub leather_type: Option<String>,
    pub animal: Option<String>,
    pub finish: Option<String>,
    pub origin: Option<String>,
    pub color: Option<String>,
    pub availability: Option<String>,
    pub is_featured: Option<String>,
    pub is_archived: Option<String>,
    pub is_active: Option<String>,
    pub negotiable: Option<String>,
}

impl LeatherListQuery {
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
    "name",
    "price",
    "animal",
    "availability",
    "sizeSqft",
    "createdAt",
    "updatedAt",
];

fn tiers_to_json(tiers: Option<Vec<PriceTier>>) -> serde_json::Value {
    tiers
        .and_then(|t| serde_json::to_value(t).ok())
        .unwrap_or_else(|| serde_json::json!([]))
}

fn filtered(q: &LeatherListQuery, params: &ListParams) -> raw_leather::BoxedQuery<'static, Pg> {
    let mut query = raw_leather::table.into_boxed();

    if let Some(value) = listing::exact(&q.leather_type) {
        query = query.filter(raw_leather::leather_type.eq(value));
    }
    if let Some(value) = listing::exact(&q.animal) {
        query = query.filter(raw_leather::animal.eq(value));
    }
    if let Some(value) = listing::exact(&q.finish) {
        query = query.filter(raw_leather::finish.eq(value));
    }
    if let Some(value) = listing::exact(&q.availability) {
        query = query.filter(raw_leather::availability.eq(value));
    }
    if let Some(p) = listing::pattern(&q.origin) {
        query = query.filter(raw_leather::origin.ilike(p));
    }
    if let Some(p) = listing::pattern(&q.color) {
        query = query.filter(array_ilike!("colors", p));
    }
    if let Some(b) = listing::flag(&q.is_featured) {
        query = query.filter(raw_leather::is_featured.eq(b));
    }
    if let Some(b) = listing::flag(&q.is_active) {
        query = query.filter(raw_leather::is_active.eq(b));
    }
    if let Some(b) = listing::flag(&q.negotiable) {
        query = query.filter(raw_leather::negotiable.eq(b));
    }
    query = query.filter(raw_leather::is_archived.eq(listing::archived(&q.is_archived)));

    if let Some(search) = &params.search {
        let p = listing::like_pattern(search);
        query = query.filter(
            raw_leather::name
                .ilike(p.clone())
                .or(raw_leather::description.ilike(p.clone()))
                .or(raw_leather::animal.ilike(p)),
        );
    }

    query
}

pub async fn list_raw_leather(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LeatherListQuery>,
) -> Result<Json<ListResponse<RawLeather>>, ApiError> {
    let params = q.params();
    let mut conn = state.conn.get()?;

    let total: i64 = filtered(&q, &params).count().get_result(&mut conn)?;

    let mut query = filtered(&q, &params);
    let (key, order) = params.sort(SORT_KEYS);
    query = match key {
        "name" => order_by!(query, order, raw_leather::name),
        "price" => order_by!(query, order, raw_leather::price),
        "animal" => order_by!(query, order, raw_leather::animal),
        "availability" => order_by!(query, order, raw_leather::availability),
        "sizeSqft" => order_by!(query, order, raw_leather::size_sqft),
        "updatedAt" => order_by!(query, order, raw_leather::updated_at),
        _ => order_by!(query, order, raw_leather::created_at),
    };

    let rows: Vec<RawLeather> = query
        .offset(params.offset())
        .limit(params.limit)
        .load(&mut conn)?;

    Ok(Json(ListResponse::new(rows, total, &params)))
}

pub async fn get_raw_leather(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RawLeather>>, ApiError> {
    let mut conn = state.conn.get()?;
    let record: RawLeather = raw_leather::table
        .filter(raw_leather::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Raw leather item"))?;
    Ok(Json(ApiResponse::new(record)))
}

pub async fn create_raw_leather(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRawLeatherRequest>,
) -> Result<Json<ApiResponse<RawLeather>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name)
        .require("leatherType", &req.leather_type)
        .require("animal", &req.animal)
        .non_empty_list("images", &req.images);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let record = RawLeather {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        leather_type: req.leather_type.trim().to_string(),
        animal: req.animal.trim().to_string(),
        finish: req.finish,
        origin: req.origin,
        size_sqft: req.size_sqft.map(bd),
        thickness_mm: req.thickness_mm.map(bd),
        colors: req.colors.unwrap_or_default(),
        description: req.description,
        price: bd(req.price),
        currency: req.currency.unwrap_or_else(|| "EUR".to_string()),
        unit: req.unit.unwrap_or_else(|| "hide".to_string()),
        price_tiers: tiers_to_json(req.price_tiers),
        availability: req.availability.unwrap_or_else(|| "in_stock".to_string()),
        is_featured: req.is_featured.unwrap_or(false),
        is_archived: false,
        is_active: true,
        negotiable: req.negotiable.unwrap_or(false),
        images: req.images,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(raw_leather::table)
        .values(&record)
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::new(record)))
}

pub async fn update_raw_leather(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRawLeatherRequest>,
) -> Result<Json<ApiResponse<RawLeather>>, ApiError> {
    if let Some(images) = &req.images {
        let mut v = Validator::new();
        v.non_empty_list("images", images);
        v.finish()?;
    }

    let mut conn = state.conn.get()?;
    let changes = RawLeatherChangeset {
        name: req.name,
        leather_type: req.leather_type,
        animal: req.animal,
        finish: req.finish,
        origin: req.origin,
        size_sqft: req.size_sqft.map(bd),
        thickness_mm: req.thickness_mm.map(bd),
        colors: req.colors,
        description: req.description,
        price: req.price.map(bd),
        currency: req.currency,
        unit: req.unit,
        price_tiers: req.price_tiers.map(|t| tiers_to_json(Some(t))),
        availability: req.availability,
        is_featured: req.is_featured,
        is_archived: req.is_archived,
        is_active: req.is_active,
        negotiable: req.negotiable,
        images: req.images,
        updated_at: Utc::now(),
    };

    let updated: RawLeather = diesel::update(raw_leather::table.filter(raw_leather::id.eq(id)))
        .set(&changes)
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Raw leather item"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_raw_leather(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let images = {
        let mut conn = state.conn.get()?;
        let record: RawLeather = raw_leather::table
            .filter(raw_leather::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Raw leather item"))?;
        diesel::delete(raw_leather::table.filter(raw_leather::id.eq(id))).execute(&mut conn)?;
        record.images
    };

    media::purge(state.images.as_ref(), &images).await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_raw_leather_images(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RemoveImagesRequest>,
) -> Result<Json<ApiResponse<RawLeather>>, ApiError> {
    let (result, removed) = {
        let mut conn = state.conn.get()?;
        let record: RawLeather = raw_leather::table
            .filter(raw_leather::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Raw leather item"))?;

        let (removed, remaining) = split_images(&record.images, &req.urls);
        if removed.is_empty() {
            (record, removed)
        } else {
            if remaining.is_empty() {
                return Err(ApiError::Validation(vec![FieldError::new(
                    "urls",
                    "a raw leather item must keep at least one image",
                )]));
            }
            let updated: RawLeather =
                diesel::update(raw_leather::table.filter(raw_leather::id.eq(id)))
                    .set((
                        raw_leather::images.eq(remaining),
                        raw_leather::updated_at.eq(Utc::now()),
                    ))
                    .get_result(&mut conn)?;
            (updated, removed)
        }
    };

    media::purge(state.images.as_ref(), &removed).await;

    Ok(Json(ApiResponse::new(result)))
}

pub fn configure_leather_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/catalog/leather", get(list_raw_leather))
        .route("/api/catalog/leather/:id", get(get_raw_leather))
        .route(
            "/api/admin/leather",
            get(list_raw_leather).post(create_raw_leather),
        )
        .route(
            "/api/admin/leather/:id",
            get(get_raw_leather)
                .put(update_raw_leather)
                .delete(delete_raw_leather),
        )
        .route(
            "/api/admin/leather/:id/remove-images",
            post(remove_raw_leather_images),
        )
}
