//! Flat shipping-fee lookup used to price sample shipments. Zones are coarse
//! on purpose; anything not matched falls into the rest-of-world bucket.

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::listing::ApiResponse;
use crate::shared::state::AppState;

pub const DEFAULT_CURRENCY: &str = "EUR";
const REST_OF_WORLD_FEE: f64 = 55.0;

/// Flat fee per destination country, in EUR.
pub fn fee_for(country: &str) -> f64 {
    match country.trim().to_uppercase().as_str() {
        // Domestic
        "NL" => 9.5,
        // EU neighbours
        "BE" | "DE" | "FR" | "LU" => 15.0,
        // Rest of EU + UK
        "AT" | "BG" | "HR" | "CY" | "CZ" | "DK" | "EE" | "FI" | "GR" | "HU" | "IE" | "IT"
        | "LV" | "LT" | "MT" | "PL" | "PT" | "RO" | "SK" | "SI" | "ES" | "SE" | "GB" => 25.0,
        // North America
        "US" | "CA" | "MX" => 35.0,
        _ => REST_OF_WORLD_FEE,
    }
}

#[derive(Debug, Deserialize)]
pub struct FeeQuery {
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingFee {
    pub country: String,
    pub fee: f64,
    pub currency: String,
}

pub async fn get_shipping_fee(Query(query): Query<FeeQuery>) -> Json<ApiResponse<ShippingFee>> {
    let country = query.country.unwrap_or_default().trim().to_uppercase();
    let fee = fee_for(&country);
    Json(ApiResponse::new(ShippingFee {
        country,
        fee,
        currency: DEFAULT_CURRENCY.to_string(),
    }))
}

pub fn configure_shipping_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/shipping/fee", get(get_shipping_fee))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_are_priced() {
        assert_eq!(fee_for("NL"), 9.5);
        assert_eq!(fee_for("de"), 15.0);
        assert_eq!(fee_for("ES"), 25.0);
        assert_eq!(fee_for("US"), 35.0);
    }

    #[test]
    fn unknown_country_gets_rest_of_world() {
        assert_eq!(fee_for("JP"), REST_OF_WORLD_FEE);
        assert_eq!(fee_for(""), REST_OF_WORLD_FEE);
        assert_eq!(fee_for("  br "), REST_OF_WORLD_FEE);
    }
}
