//! Events forwarded to the automation webhooks
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;
use crate::domain::aggregates::OrderStatus;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    #[serde(rename = "order.status_changed")]
    StatusChanged { order_id: String, status: OrderStatus, tracking_number: Option<String>, courier: Option<String>, order: Value },
    #[serde(rename = "order.invoice_requested")]
    InvoiceRequested { order_id: String, order: Value },
}

impl OrderEvent {
    pub fn order_id(&self) -> &str {
        match self { Self::StatusChanged { order_id, .. } | Self::InvoiceRequested { order_id, .. } => order_id }
    }
}

/// Wire envelope posted to a webhook
#[derive(Clone, Debug, Serialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub source: &'static str,
    #[serde(flatten)]
    pub event: OrderEvent,
}

impl EventEnvelope {
    pub fn new(event: OrderEvent) -> Self {
        Self { id: Uuid::now_v7(), occurred_at: Utc::now(), source: "storefront-functions", event }
    }
}
