//! Instant Transaction Notification (ITN) handling

use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;

use crate::config::{require, Config};
use crate::domain::aggregates::OrderStatus;
use crate::payfast::signature::{verify_signature, PaymentFields};
use crate::upstream::supabase::{eq, SupabaseClient};
use crate::{Result, StorefrontError};

/// Largest difference between the gateway's gross amount and the order total.
const AMOUNT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// A notification whose signature and merchant have been checked
#[derive(Debug, Clone)]
pub struct VerifiedNotification {
    pub m_payment_id: String,
    pub pf_payment_id: Option<String>,
    pub payment_status: String,
    pub amount_gross: Option<Decimal>,
}

impl VerifiedNotification {
    pub fn order_status(&self) -> Option<OrderStatus> { OrderStatus::from_payment_status(&self.payment_status) }
}

pub fn verify_notification(config: &Config, fields: &PaymentFields) -> Result<VerifiedNotification> {
    let merchant_id = require(&config.payfast.merchant_id, "PAYFAST_MERCHANT_ID")?;

    if !verify_signature(fields, config.payfast.passphrase.as_deref()) {
        return Err(StorefrontError::bad_request("Invalid signature"));
    }
    if fields.get("merchant_id").map(str::trim) != Some(merchant_id) {
        return Err(StorefrontError::bad_request("Merchant mismatch"));
    }
    let m_payment_id = fields
        .get("m_payment_id")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StorefrontError::bad_request("Missing m_payment_id"))?;
    let amount_gross = match fields.get("amount_gross").map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => Some(Decimal::from_str(raw).map_err(|_| StorefrontError::bad_request("Invalid amount_gross"))?),
        None => None,
    };

    Ok(VerifiedNotification {
        m_payment_id: m_payment_id.to_string(),
        pf_payment_id: fields.get("pf_payment_id").map(|v| v.trim().to_string()).filter(|v| !v.is_empty()),
        payment_status: fields.get("payment_status").unwrap_or_default().trim().to_string(),
        amount_gross,
    })
}

/// Reads the order total in major units. Numeric and string columns are both accepted.
pub fn order_total(order: &Value) -> Option<Decimal> {
    match order.get("total_amount")? {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Applies a verified notification to the order it names. Returns the status written, if any.
pub async fn apply_notification(supabase: &SupabaseClient, notification: &VerifiedNotification) -> Result<Option<OrderStatus>> {
    let order: Value = supabase
        .select_one("orders", &[("id", eq(&notification.m_payment_id)), ("select", "id,total_amount,status".to_string())])
        .await?
        .ok_or_else(|| StorefrontError::not_found(format!("Order {} not found", notification.m_payment_id)))?;

    if let (Some(gross), Some(total)) = (notification.amount_gross, order_total(&order)) {
        if (gross - total).abs() > AMOUNT_TOLERANCE {
            tracing::warn!(m_payment_id = %notification.m_payment_id, %gross, %total, "ITN amount mismatch");
            return Err(StorefrontError::bad_request("Amount mismatch"));
        }
    }

    let Some(status) = notification.order_status() else {
        tracing::info!(m_payment_id = %notification.m_payment_id, payment_status = %notification.payment_status, "ITN acknowledged without update");
        return Ok(None);
    };

    let body = json!({
        "status": status,
        "payment_status": notification.payment_status,
        "payfast_payment_id": notification.pf_payment_id,
        "updated_at": chrono::Utc::now(),
    });
    supabase.update("orders", &[("id", eq(&notification.m_payment_id))], &body).await?;
    tracing::info!(m_payment_id = %notification.m_payment_id, %status, "order updated from ITN");
    Ok(Some(status))
}
