//! HTTP surface: one route per storefront function

pub mod coupon;
pub mod orders;
pub mod payfast;
pub mod postal;
pub mod shipping;

use axum::{
    http::{header, HeaderMap},
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::upstream::{ShiplogicClient, SupabaseClient, WebhookClient};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config: Arc::new(config), http: reqwest::Client::new() }
    }

    pub fn supabase(&self) -> Result<SupabaseClient> { SupabaseClient::from_config(self.http.clone(), &self.config) }
    pub fn shiplogic(&self) -> Result<ShiplogicClient> { ShiplogicClient::from_config(self.http.clone(), &self.config) }

    pub fn status_webhook(&self) -> Option<WebhookClient> {
        self.config.status_webhook_url.as_ref().map(|url| WebhookClient::new(self.http.clone(), url.clone()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-functions"})) }))
        .route("/apply-coupon", post(coupon::apply_coupon))
        .route("/admin-order-status", patch(orders::update_order_status))
        .route("/payfast-checkout", post(payfast::checkout))
        .route("/payfast-notify", post(payfast::notify))
        .route("/pickup-points", get(shipping::pickup_points))
        .route("/shipping-track", get(shipping::track_shipment))
        .route("/user-orders", get(orders::user_orders))
        .route("/za-postal-search", get(postal::search))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Extracts the token from an `Authorization: Bearer ...` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StorefrontError::Unauthorized("Missing bearer token".into()))
}

/// Parses a JSON body, reporting malformed input as a 400 with our error body.
pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.is_empty() {
        return Err(StorefrontError::bad_request("Request body is required"));
    }
    serde_json::from_slice(body).map_err(|e| StorefrontError::bad_request(format!("Invalid JSON body: {e}")))
}
