//! Customer lead requests: quotes, paid sample shipments and
//! custom-manufacturing inquiries. All are created by public form
//! submissions and only ever mutated by admin actions afterwards.
//!
//! When a submission references a catalog product, its name and category are
//! copied onto the request at submission time. Later edits to the product do
//! not flow back into the request.

pub mod custom;
pub mod quotes;
pub mod samples;

use diesel::prelude::*;
use uuid::Uuid;

use crate::shared::error::ApiError;
use crate::shared::schema::products;

/// Denormalized product reference captured at submission time.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub product_id: Option<Uuid>,
    pub name: String,
    pub category: Option<String>,
}

/// Resolves the referenced product, or falls back to the free-text name the
/// form supplied when no id was given.
pub fn snapshot_product(
    conn: &mut PgConnection,
    product_id: Option<Uuid>,
    fallback_name: Option<&str>,
) -> Result<ProductSnapshot, ApiError> {
    match product_id {
        Some(id) => {
            let (name, category): (String, String) = products::table
                .filter(products::id.eq(id))
                .select((products::name, products::product_type))
                .first(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Product"))?;
            Ok(ProductSnapshot {
                product_id: Some(id),
                name,
                category: Some(category),
            })
        }
        None => Ok(ProductSnapshot {
            product_id: None,
            name: fallback_name.unwrap_or_default().trim().to_string(),
            category: None,
        }),
    }
}
