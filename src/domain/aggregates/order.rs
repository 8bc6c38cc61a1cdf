//! Order status and status changes

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use crate::domain::events::OrderEvent;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Packed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 10] = [
        Self::Pending, Self::Paid, Self::Processing, Self::Packed, Self::Shipped,
        Self::OutForDelivery, Self::Delivered, Self::Cancelled, Self::Refunded, Self::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        }
    }

    /// Maps a gateway `payment_status` to the order status it implies, if any.
    pub fn from_payment_status(payment_status: &str) -> Option<Self> {
        match payment_status.trim().to_ascii_uppercase().as_str() {
            "COMPLETE" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|st| st.as_str() == wanted).ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

/// A requested change of status (and optionally tracking) on one order
#[derive(Clone, Debug)]
pub struct StatusChange {
    order_id: String,
    status: OrderStatus,
    tracking_number: Option<String>,
    courier: Option<String>,
    note: Option<String>,
}

impl StatusChange {
    pub fn new(order_id: impl Into<String>, status: OrderStatus) -> Result<Self, OrderError> {
        let order_id = order_id.into().trim().to_string();
        if order_id.is_empty() { return Err(OrderError::MissingOrderId); }
        Ok(Self { order_id, status, tracking_number: None, courier: None, note: None })
    }

    pub fn with_tracking(mut self, tracking_number: Option<String>, courier: Option<String>) -> Self {
        self.tracking_number = non_blank(tracking_number);
        self.courier = non_blank(courier);
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self { self.note = non_blank(note); self }

    pub fn order_id(&self) -> &str { &self.order_id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn tracking_number(&self) -> Option<&str> { self.tracking_number.as_deref() }

    /// Column values for the REST PATCH. Absent optional fields are left untouched.
    pub fn patch_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("status".into(), json!(self.status));
        if let Some(t) = &self.tracking_number { body.insert("tracking_number".into(), json!(t)); }
        if let Some(c) = &self.courier { body.insert("courier".into(), json!(c)); }
        if let Some(n) = &self.note { body.insert("status_note".into(), json!(n)); }
        body.insert("updated_at".into(), json!(chrono::Utc::now()));
        Value::Object(body)
    }

    /// Event announcing the change, carrying the updated order row.
    pub fn into_event(self, order: Value) -> OrderEvent {
        OrderEvent::StatusChanged {
            order_id: self.order_id,
            status: self.status,
            tracking_number: self.tracking_number,
            courier: self.courier,
            order,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum OrderError { UnknownStatus(String), MissingOrderId }
impl std::error::Error for OrderError {}
impl std::fmt::Display for OrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownStatus(s) => {
                let allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                write!(f, "Invalid status '{}'. Allowed: {}", s, allowed.join(", "))
            }
            Self::MissingOrderId => write!(f, "order_id is required"),
        }
    }
}
