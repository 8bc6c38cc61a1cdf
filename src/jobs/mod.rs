//! Sequential backfill jobs
//!
//! Each job loads one bounded page of rows and handles them one at a time.
//! A failing row is logged and counted; the job moves on to the next one.
//! Nothing is rolled back.

pub mod postal_import;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;

use crate::domain::aggregates::{OrderStatus, StatusChange};
use crate::domain::events::OrderEvent;
use crate::upstream::supabase::eq;
use crate::upstream::{SupabaseClient, WebhookClient};
use crate::Result;

pub use postal_import::{import_postal_codes, PostalCodeRow};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BackfillReport {
    pub fn record<T, E: fmt::Display>(&mut self, label: &str, outcome: std::result::Result<T, E>) {
        self.attempted += 1;
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(e) => {
                self.failed += 1;
                tracing::error!(item = label, error = %e, "backfill item failed");
            }
        }
    }
}

impl fmt::Display for BackfillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempted={} succeeded={} failed={}", self.attempted, self.succeeded, self.failed)
    }
}

/// Runs `action` over `items` strictly in order, one at a time.
pub async fn run_sequential<T, F, Fut>(items: Vec<T>, label: impl Fn(&T) -> String, mut action: F) -> BackfillReport
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut report = BackfillReport::default();
    for item in items {
        let name = label(&item);
        tracing::debug!(item = %name, "processing");
        report.record(&name, action(item).await);
    }
    report
}

fn order_label(order: &Value) -> String {
    match order.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<no id>".to_string(),
    }
}

/// Paid orders that never got an invoice: ask the invoice webhook for each.
pub async fn backfill_invoices(supabase: &SupabaseClient, webhook: &WebhookClient, limit: u32) -> Result<BackfillReport> {
    let orders: Vec<Value> = supabase
        .select(
            "orders",
            &[
                ("status", eq(OrderStatus::Paid)),
                ("invoice_url", "is.null".to_string()),
                ("order", "created_at.asc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;
    tracing::info!(count = orders.len(), "orders missing invoices");

    Ok(run_sequential(orders, order_label, |order| async move {
        let order_id = order_label(&order);
        webhook.send(OrderEvent::InvoiceRequested { order_id, order }).await
    })
    .await)
}

/// Re-sends the status webhook for every order currently in `status`.
pub async fn backfill_status_webhooks(supabase: &SupabaseClient, webhook: &WebhookClient, status: OrderStatus, limit: u32) -> Result<BackfillReport> {
    let orders: Vec<Value> = supabase
        .select(
            "orders",
            &[("status", eq(status)), ("order", "updated_at.asc".to_string()), ("limit", limit.to_string())],
        )
        .await?;
    tracing::info!(count = orders.len(), %status, "orders to re-notify");

    Ok(run_sequential(orders, order_label, |order| async move {
        let change = StatusChange::new(order_label(&order), status)
            .map_err(|e| crate::StorefrontError::Internal(e.to_string()))?
            .with_tracking(
                order.get("tracking_number").and_then(Value::as_str).map(String::from),
                order.get("courier").and_then(Value::as_str).map(String::from),
            );
        webhook.send(change.into_event(order)).await
    })
    .await)
}
