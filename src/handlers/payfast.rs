use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

use super::{parse_json, AppState};
use crate::payfast::{apply_notification, build_checkout, verify_notification, CheckoutForm, CheckoutRequest, PaymentFields};
use crate::{Result, StorefrontError};

pub async fn checkout(State(state): State<AppState>, body: Bytes) -> Result<Json<CheckoutForm>> {
    let request: CheckoutRequest = parse_json(&body)?;
    let form = build_checkout(&state.config, &request)?;
    tracing::info!(m_payment_id = %request.order_id, "checkout prepared");
    Ok(Json(form))
}

pub async fn notify(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let fields = PaymentFields::from_form(&body);
    if fields.is_empty() {
        return Err(StorefrontError::bad_request("Empty notification"));
    }
    let notification = verify_notification(&state.config, &fields)?;
    tracing::info!(
        m_payment_id = %notification.m_payment_id,
        payment_status = %notification.payment_status,
        "ITN received"
    );
    let supabase = state.supabase()?;
    let status = apply_notification(&supabase, &notification).await?;
    Ok(Json(json!({ "received": true, "status": status })))
}
