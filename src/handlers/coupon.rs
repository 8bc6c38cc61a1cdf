use axum::{body::Bytes, extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_json, AppState};
use crate::domain::aggregates::{CartLineInput, CouponCart, CouponCartLine};
use crate::domain::value_objects::Cents;
use crate::{Result, StorefrontError};

pub const COUPON_RPC: &str = "apply_coupon";
const DEFAULT_REJECTION: &str = "Invalid coupon code";

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default, alias = "items")]
    pub cart: Vec<CartLineInput>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct CouponRpcArgs<'a> {
    p_code: String,
    p_subtotal_cents: Cents,
    p_items: &'a [CouponCartLine],
    p_user_id: Option<&'a str>,
}

pub async fn apply_coupon(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: ApplyCouponRequest = parse_json(&body)?;
    let code = request.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(StorefrontError::bad_request("Coupon code is required"));
    }
    let cart = CouponCart::from_lines(&request.cart).map_err(|e| StorefrontError::bad_request(e.to_string()))?;
    let supabase = state.supabase()?;

    let args = CouponRpcArgs {
        p_code: code.clone(),
        p_subtotal_cents: cart.subtotal(),
        p_items: cart.lines(),
        p_user_id: request.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty()),
    };
    let result = match supabase.rpc(COUPON_RPC, &args).await {
        Ok(result) => result,
        // The procedure raises on codes it refuses; PostgREST answers 400 with `{message}`.
        Err(StorefrontError::Upstream { status: 400, body, .. }) => serde_json::from_str(&body).unwrap_or(Value::Null),
        Err(e) => return Err(e),
    };

    match interpret_coupon_result(result) {
        Ok(mut payload) => {
            tracing::info!(code = %code, subtotal_cents = cart.subtotal().value(), "coupon applied");
            payload["subtotal_cents"] = json!(cart.subtotal());
            Ok(Json(payload).into_response())
        }
        Err(message) => {
            tracing::info!(code = %code, reason = %message, "coupon rejected");
            Ok((StatusCode::BAD_REQUEST, Json(json!({ "valid": false, "message": message }))).into_response())
        }
    }
}

/// Accepts the procedure's answer only when it says `valid: true`; otherwise
/// yields the message to show the shopper. A one-row array is unwrapped.
pub fn interpret_coupon_result(result: Value) -> std::result::Result<Value, String> {
    let row = match result {
        Value::Array(rows) => rows.into_iter().next().unwrap_or(Value::Null),
        other => other,
    };
    if row.get("valid").and_then(Value::as_bool) == Some(true) {
        return Ok(row);
    }
    let message = ["message", "error"]
        .iter()
        .filter_map(|k| row.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(DEFAULT_REJECTION);
    Err(message.to_string())
}
