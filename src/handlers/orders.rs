use axum::{body::Bytes, extract::{Query, State}, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{bearer_token, parse_json, AppState};
use crate::config::require;
use crate::domain::aggregates::{OrderStatus, StatusChange};
use crate::upstream::supabase::eq;
use crate::{Result, StorefrontError};

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";
const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub status: String,
    pub tracking_number: Option<String>,
    pub courier: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub order: Value,
    pub webhook_forwarded: bool,
}

fn check_admin_secret(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let expected = require(&state.config.admin_secret, "ADMIN_SECRET")?;
    let provided = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StorefrontError::Unauthorized("Missing admin secret".into()))?;
    if provided != expected {
        return Err(StorefrontError::Forbidden("Invalid admin secret".into()));
    }
    Ok(())
}

pub async fn update_order_status(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Json<StatusUpdateResponse>> {
    check_admin_secret(&state, &headers)?;
    let request: StatusUpdateRequest = parse_json(&body)?;
    let status = request.status.parse::<OrderStatus>().map_err(|e| StorefrontError::bad_request(e.to_string()))?;
    let change = StatusChange::new(request.order_id, status)
        .map_err(|e| StorefrontError::bad_request(e.to_string()))?
        .with_tracking(request.tracking_number, request.courier)
        .with_note(request.note);

    let supabase = state.supabase()?;
    let order = supabase
        .update("orders", &[("id", eq(change.order_id()))], &change.patch_body())
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StorefrontError::not_found(format!("Order {} not found", change.order_id())))?;
    tracing::info!(order_id = %change.order_id(), status = %change.status(), "order status updated");

    // Best effort: the update already happened, so a webhook failure is only logged.
    let webhook_forwarded = match state.status_webhook() {
        Some(webhook) => match webhook.send(change.into_event(order.clone())).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "status webhook failed");
                false
            }
        },
        None => {
            tracing::debug!("status webhook not configured");
            false
        }
    };

    Ok(Json(StatusUpdateResponse { order, webhook_forwarded }))
}

#[derive(Debug, Deserialize)]
pub struct UserOrdersParams {
    pub limit: Option<u32>,
}

pub async fn user_orders(State(state): State<AppState>, headers: HeaderMap, Query(params): Query<UserOrdersParams>) -> Result<Json<Value>> {
    let token = bearer_token(&headers)?;
    let supabase = state.supabase()?;
    let user = supabase.auth_user(token).await?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let orders: Vec<Value> = supabase
        .select(
            "orders",
            &[
                ("select", "*,order_items(*)".to_string()),
                ("user_id", eq(&user.id)),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;
    tracing::debug!(user_id = %user.id, count = orders.len(), "user orders loaded");
    Ok(Json(serde_json::json!({ "orders": orders })))
}
