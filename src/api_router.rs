//! Combines the per-domain routers into the unified API surface.

use axum::{routing::get, Json, Router};
use std::sync::Arc;

use crate::shared::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "status": "ok" }))
}

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .merge(crate::catalog::configure_catalog_routes())
        .merge(crate::leather::configure_leather_routes())
        .merge(crate::taxonomy::configure_taxonomy_routes())
        .merge(crate::leads::quotes::configure_quote_routes())
        .merge(crate::leads::samples::configure_sample_routes())
        .merge(crate::leads::custom::configure_custom_routes())
        .merge(crate::messages::configure_message_routes())
        .merge(crate::shipping::configure_shipping_routes())
}
