//! Finished leather products: public catalog listing plus the admin CRUD
//! surface. Deleting or trimming images also issues best-effort deletions
//! against the external image host; the database row is authoritative.

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

use crate::listing::{self, ApiResponse, ListParams, ListResponse};
use crate::media;
use crate::shared::error::ApiError;
use crate::shared::schema::products;
use crate::shared::state::AppState;
use crate::shared::utils::bd;
use crate::shared::validate::Validator;
use crate::{array_ilike, order_by};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub product_type: String,
    pub description: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub colors: Vec<String>,
    pub price: BigDecimal,
    pub currency: String,
    pub unit: String,
    pub price_tiers: serde_json::Value,
    pub availability: String,
    pub stock_quantity: i32,
    pub is_featured: bool,
    pub is_archived: bool,
    pub sample_available: bool,
    pub discount_available: bool,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub min_qty: i32,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub product_type: String,
    pub description: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub colors: Option<Vec<String>>,
    pub price: f64,
    pub currency: Option<String>,
    pub unit: Option<String>,
    pub price_tiers: Option<Vec<PriceTier>>,
    pub availability: Option<String>,
    pub stock_quantity: Option<i32>,
    pub is_featured: Option<bool>,
    pub sample_available: Option<bool>,
    pub discount_available: Option<bool>,
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub colors: Option<Vec<String>>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub unit: Option<String>,
    pub price_tiers: Option<Vec<PriceTier>>,
    pub availability: Option<String>,
    pub stock_quantity: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    pub sample_available: Option<bool>,
    pub discount_available: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
struct ProductChangeset {
    name: Option<String>,
    product_type: Option<String>,
    description: Option<String>,
    material: Option<String>,
    dimensions: Option<String>,
    colors: Option<Vec<String>>,
    price: Option<BigDecimal>,
    currency: Option<String>,
    unit: Option<String>,
    price_tiers: Option<serde_json::Value>,
    availability: Option<String>,
    stock_quantity: Option<i32>,
    is_featured: Option<bool>,
    is_archived: Option<bool>,
    sample_available: Option<bool>,
    discount_available: Option<bool>,
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
pub struct ProductListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
    pub product_type: Option<String>,
    pub material: Option<String>,
    pub color: Option<String>,
    pub availability: Option<String>,
    pub is_featured: Option<String>,
    pub is_archived: Option<String>,
    pub sample_available: Option<String>,
    pub discount_available: Option<String>,
}

impl ProductListQuery {
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
    "availability",
    "stockQuantity",
    "createdAt",
    "updatedAt",
];

fn tiers_to_json(tiers: Option<Vec<PriceTier>>) -> serde_json::Value {
    tiers
        .and_then(|t| serde_json::to_value(t).ok())
        .unwrap_or_else(|| serde_json::json!([]))
}

/// Builds the filter set once; called twice per list request, for the page
/// and for the total count. Distinct fields AND together; `search` ORs
/// across name, description and material.
fn filtered(q: &ProductListQuery, params: &ListParams) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();

    if let Some(value) = listing::exact(&q.product_type) {
        query = query.filter(products::product_type.eq(value));
    }
    if let Some(value) = listing::exact(&q.availability) {
        query = query.filter(products::availability.eq(value));
    }
    if let Some(p) = listing::pattern(&q.material) {
        query = query.filter(products::material.ilike(p));
    }
    if let Some(p) = listing::pattern(&q.color) {
        query = query.filter(array_ilike!("colors", p));
    }
    if let Some(b) = listing::flag(&q.is_featured) {
        query = query.filter(products::is_featured.eq(b));
    }
    if let Some(b) = listing::flag(&q.sample_available) {
        query = query.filter(products::sample_available.eq(b));
    }
    if let Some(b) = listing::flag(&q.discount_available) {
        query = query.filter(products::discount_available.eq(b));
    }
    query = query.filter(products::is_archived.eq(listing::archived(&q.is_archived)));

    if let Some(search) = &params.search {
        let p = listing::like_pattern(search);
        query = query.filter(
            products::name
                .ilike(p.clone())
                .or(products::description.ilike(p.clone()))
                .or(products::material.ilike(p)),
        );
    }

    query
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ProductListQuery>,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    let params = q.params();
    let mut conn = state.conn.get()?;

    let total: i64 = filtered(&q, &params).count().get_result(&mut conn)?;

    let mut query = filtered(&q, &params);
    let (key, order) = params.sort(SORT_KEYS);
    query = match key {
        "name" => order_by!(query, order, products::name),
        "price" => order_by!(query, order, products::price),
        "availability" => order_by!(query, order, products::availability),
        "stockQuantity" => order_by!(query, order, products::stock_quantity),
        "updatedAt" => order_by!(query, order, products::updated_at),
        _ => order_by!(query, order, products::created_at),
    };

    let rows: Vec<Product> = query
        .offset(params.offset())
        .limit(params.limit)
        .load(&mut conn)?;

    Ok(Json(ListResponse::new(rows, total, &params)))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let mut conn = state.conn.get()?;
    let product: Product = products::table
        .filter(products::id.eq(id))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Product"))?;
    Ok(Json(ApiResponse::new(product)))
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name)
        .require("productType", &req.product_type)
        .non_empty_list("images", &req.images);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let now = Utc::now();

    let product = Product {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        product_type: req.product_type.trim().to_string(),
        description: req.description,
        material: req.material,
        dimensions: req.dimensions,
        colors: req.colors.unwrap_or_default(),
        price: bd(req.price),
        currency: req.currency.unwrap_or_else(|| "EUR".to_string()),
        unit: req.unit.unwrap_or_else(|| "piece".to_string()),
        price_tiers: tiers_to_json(req.price_tiers),
        availability: req.availability.unwrap_or_else(|| "in_stock".to_string()),
        stock_quantity: req.stock_quantity.unwrap_or(0),
        is_featured: req.is_featured.unwrap_or(false),
        is_archived: false,
        sample_available: req.sample_available.unwrap_or(false),
        discount_available: req.discount_available.unwrap_or(false),
        images: req.images,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(products::table)
        .values(&product)
        .execute(&mut conn)?;

    Ok(Json(ApiResponse::new(product)))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    if let Some(images) = &req.images {
        let mut v = Validator::new();
        v.non_empty_list("images", images);
        v.finish()?;
    }

    let mut conn = state.conn.get()?;
    let changes = ProductChangeset {
        name: req.name,
        product_type: req.product_type,
        description: req.description,
        material: req.material,
        dimensions: req.dimensions,
        colors: req.colors,
        price: req.price.map(bd),
        currency: req.currency,
        unit: req.unit,
        price_tiers: req.price_tiers.map(|t| tiers_to_json(Some(t))),
        availability: req.availability,
        stock_quantity: req.stock_quantity,
        is_featured: req.is_featured,
        is_archived: req.is_archived,
        sample_available: req.sample_available,
        discount_available: req.discount_available,
        images: req.images,
        updated_at: Utc::now(),
    };

    let updated: Product = diesel::update(products::table.filter(products::id.eq(id)))
        .set(&changes)
        .get_result(&mut conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Product"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let images = {
        let mut conn = state.conn.get()?;
        let product: Product = products::table
            .filter(products::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Product"))?;
        diesel::delete(products::table.filter(products::id.eq(id))).execute(&mut conn)?;
        product.images
    };

    // Row is gone; remote assets are cleaned up opportunistically.
    media::purge(state.images.as_ref(), &images).await;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_product_images(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<RemoveImagesRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let (result, removed) = {
        let mut conn = state.conn.get()?;
        let product: Product = products::table
            .filter(products::id.eq(id))
            .first(&mut conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Product"))?;

        let (removed, remaining) = split_images(&product.images, &req.urls);
        if removed.is_empty() {
            // Nothing referenced matched: no-op, not an error.
            (product, removed)
        } else {
            if remaining.is_empty() {
                return Err(ApiError::Validation(vec![
                    crate::shared::error::FieldError::new(
                        "urls",
                        "a product must keep at least one image",
                    ),
                ]));
            }
            let updated: Product = diesel::update(products::table.filter(products::id.eq(id)))
                .set((
                    products::images.eq(remaining),
                    products::updated_at.eq(Utc::now()),
                ))
                .get_result(&mut conn)?;
            (updated, removed)
        }
    };

    media::purge(state.images.as_ref(), &removed).await;

    Ok(Json(ApiResponse::new(result)))
}

/// Partitions the stored image list into (removed, remaining) against the
/// requested URLs. URLs not present on the record are ignored.
pub(crate) fn split_images(stored: &[String], requested: &[String]) -> (Vec<String>, Vec<String>) {
    let mut removed = Vec::new();
    let mut remaining = Vec::new();
    for url in stored {
        if requested.contains(url) {
            removed.push(url.clone());
        } else {
            remaining.push(url.clone());
        }
    }
    (removed, remaining)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_products: i64,
    pub featured_products: i64,
    pub archived_products: i64,
}

pub async fn get_catalog_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CatalogStats>>, ApiError> {
    let mut conn = state.conn.get()?;

    let total_products: i64 = products::table.count().get_result(&mut conn)?;
    let featured_products: i64 = products::table
        .filter(products::is_featured.eq(true))
        .filter(products::is_archived.eq(false))
        .count()
        .get_result(&mut conn)?;
    let archived_products: i64 = products::table
        .filter(products::is_archived.eq(true))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(ApiResponse::new(CatalogStats {
        total_products,
        featured_products,
        archived_products,
    })))
}

pub fn configure_catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Public catalog (archived items hidden by the default filter).
        .route("/api/catalog/products", get(list_products))
        .route("/api/catalog/products/:id", get(get_product))
        // Admin back office.
        .route(
            "/api/admin/products",
            get(list_products).post(create_product),
        )
        .route(
            "/api/admin/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/api/admin/products/:id/remove-images",
            post(remove_product_images),
        )
        .route("/api/admin/products/stats", get(get_catalog_stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_images_partitions_matches() {
        let stored = urls(&["a.jpg", "b.jpg", "c.jpg"]);
        let (removed, remaining) = split_images(&stored, &urls(&["b.jpg"]));
        assert_eq!(removed, urls(&["b.jpg"]));
        assert_eq!(remaining, urls(&["a.jpg", "c.jpg"]));
    }

    #[test]
    fn split_images_ignores_unknown_urls() {
        let stored = urls(&["a.jpg"]);
        let (removed, remaining) = split_images(&stored, &urls(&["zzz.jpg"]));
        assert!(removed.is_empty());
        assert_eq!(remaining, stored);
    }

    #[test]
    fn split_images_empty_request_is_noop() {
        let stored = urls(&["a.jpg", "b.jpg"]);
        let (removed, remaining) = split_images(&stored, &[]);
        assert!(removed.is_empty());
        assert_eq!(remaining, stored);
    }

    #[test]
    fn tiers_default_to_empty_array() {
        assert_eq!(tiers_to_json(None), serde_json::json!([]));
        let v = tiers_to_json(Some(vec![PriceTier {
            min_qty: 100,
            price: 7.5,
        }]));
        assert_eq!(v, serde_json::json!([{"minQty": 100, "price": 7.5}]));
    }
}
