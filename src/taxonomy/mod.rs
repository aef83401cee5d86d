//! Admin-managed reference lists: product types and raw-leather types.
//! Catalog items reference these by name only; deleting a type neither
//! blocks on nor cascades to items still carrying the name.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::listing::ApiResponse;
use crate::shared::error::ApiError;
use crate::shared::schema::{leather_types, product_types};
use crate::shared::state::AppState;
use crate::shared::validate::Validator;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = product_types)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = leather_types)]
#[serde(rename_all = "camelCase")]
pub struct LeatherType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TaxonomyRequest {
    pub name: String,
}

fn duplicate_name(err: ApiError, name: &str) -> ApiError {
    match err {
        ApiError::Conflict(_) => ApiError::Conflict(format!("Type \"{name}\" already exists")),
        other => other,
    }
}

pub async fn create_product_type(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaxonomyRequest>,
) -> Result<Json<ApiResponse<ProductType>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let record = ProductType {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(product_types::table)
        .values(&record)
        .execute(&mut conn)
        .map_err(|e| duplicate_name(e.into(), &record.name))?;

    Ok(Json(ApiResponse::new(record)))
}

pub async fn list_product_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProductType>>>, ApiError> {
    let mut conn = state.conn.get()?;
    let types: Vec<ProductType> = product_types::table
        .order(product_types::name.asc())
        .load(&mut conn)?;
    Ok(Json(ApiResponse::new(types)))
}

pub async fn update_product_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TaxonomyRequest>,
) -> Result<Json<ApiResponse<ProductType>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let name = req.name.trim().to_string();
    let updated: ProductType =
        diesel::update(product_types::table.filter(product_types::id.eq(id)))
            .set((
                product_types::name.eq(&name),
                product_types::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .optional()
            .map_err(|e| duplicate_name(e.into(), &name))?
            .ok_or_else(|| ApiError::not_found("Product type"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_product_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    let affected = diesel::delete(product_types::table.filter(product_types::id.eq(id)))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::not_found("Product type"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_leather_type(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TaxonomyRequest>,
) -> Result<Json<ApiResponse<LeatherType>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let now = Utc::now();
    let record = LeatherType {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(leather_types::table)
        .values(&record)
        .execute(&mut conn)
        .map_err(|e| duplicate_name(e.into(), &record.name))?;

    Ok(Json(ApiResponse::new(record)))
}

pub async fn list_leather_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LeatherType>>>, ApiError> {
    let mut conn = state.conn.get()?;
    let types: Vec<LeatherType> = leather_types::table
        .order(leather_types::name.asc())
        .load(&mut conn)?;
    Ok(Json(ApiResponse::new(types)))
}

pub async fn update_leather_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TaxonomyRequest>,
) -> Result<Json<ApiResponse<LeatherType>>, ApiError> {
    let mut v = Validator::new();
    v.require("name", &req.name);
    v.finish()?;

    let mut conn = state.conn.get()?;
    let name = req.name.trim().to_string();
    let updated: LeatherType =
        diesel::update(leather_types::table.filter(leather_types::id.eq(id)))
            .set((
                leather_types::name.eq(&name),
                leather_types::updated_at.eq(Utc::now()),
            ))
            .get_result(&mut conn)
            .optional()
            .map_err(|e| duplicate_name(e.into(), &name))?
            .ok_or_else(|| ApiError::not_found("Leather type"))?;

    Ok(Json(ApiResponse::new(updated)))
}

pub async fn delete_leather_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.conn.get()?;
    let affected = diesel::delete(leather_types::table.filter(leather_types::id.eq(id)))
        .execute(&mut conn)?;
    if affected == 0 {
        return Err(ApiError::not_found("Leather type"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn configure_taxonomy_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/admin/product-types",
            get(list_product_types).post(create_product_type),
        )
        .route(
            "/api/admin/product-types/:id",
            axum::routing::put(update_product_type).delete(delete_product_type),
        )
        .route(
            "/api/admin/leather-types",
            get(list_leather_types).post(create_leather_type),
        )
        .route(
            "/api/admin/leather-types/:id",
            axum::routing::put(update_leather_type).delete(delete_leather_type),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_rewritten_with_the_name() {
        let err = duplicate_name(ApiError::Conflict("raw".to_string()), "Belts");
        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Type \"Belts\" already exists"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn non_conflict_errors_pass_through() {
        let err = duplicate_name(ApiError::Database("down".to_string()), "Belts");
        assert!(matches!(err, ApiError::Database(_)));
    }
}
