//! Signed checkout form for the PayFast redirect

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::{require, Config};
use crate::domain::value_objects::format_amount;
use crate::payfast::signature::{generate_signature, FieldOrder, PaymentFields, SIGNATURE_FIELD};
use crate::{Result, StorefrontError};

const ITEM_NAME_MAX: usize = 100;
const ITEM_DESCRIPTION_MAX: usize = 255;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    pub amount: Decimal,
    #[validate(length(min = 1))]
    pub item_name: String,
    pub item_description: Option<String>,
    #[validate(email)]
    pub email_address: String,
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub cell_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutForm {
    pub action_url: &'static str,
    /// Signed fields, serialized in the order they were signed
    pub fields: PaymentFields,
}

/// Builds the signed redirect fields, in the gateway's documented order.
pub fn build_checkout(config: &Config, request: &CheckoutRequest) -> Result<CheckoutForm> {
    request.validate()?;
    if request.amount <= Decimal::ZERO {
        return Err(StorefrontError::bad_request("amount must be greater than zero"));
    }

    let payfast = &config.payfast;
    let mut fields = PaymentFields::new();
    fields.push("merchant_id", require(&payfast.merchant_id, "PAYFAST_MERCHANT_ID")?);
    fields.push("merchant_key", require(&payfast.merchant_key, "PAYFAST_MERCHANT_KEY")?);
    fields.push("return_url", require(&payfast.return_url, "PAYFAST_RETURN_URL")?);
    fields.push("cancel_url", require(&payfast.cancel_url, "PAYFAST_CANCEL_URL")?);
    fields.push("notify_url", require(&payfast.notify_url, "PAYFAST_NOTIFY_URL")?);
    fields.push_opt("name_first", request.name_first.as_deref());
    fields.push_opt("name_last", request.name_last.as_deref());
    fields.push("email_address", request.email_address.trim());
    fields.push_opt("cell_number", request.cell_number.as_deref());
    fields.push("m_payment_id", request.order_id.trim());
    fields.push("amount", format_amount(request.amount));
    fields.push("item_name", truncate(&request.item_name, ITEM_NAME_MAX));
    fields.push_opt("item_description", request.item_description.as_deref().map(|d| truncate(d, ITEM_DESCRIPTION_MAX)));

    let signature = generate_signature(&fields, FieldOrder::AsGiven, payfast.passphrase.as_deref());
    tracing::debug!(m_payment_id = %request.order_id, "signed checkout fields");

    let mut out: PaymentFields = fields
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k, v.trim()))
        .collect();
    out.push(SIGNATURE_FIELD, signature);

    Ok(CheckoutForm { action_url: config.payfast_process_url(), fields: out })
}

fn truncate(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect()
}
