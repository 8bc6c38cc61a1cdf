//! Automation webhook (n8n) delivery

use reqwest::Client;

use super::ensure_success;
use crate::domain::events::{EventEnvelope, OrderEvent};
use crate::Result;

const SERVICE: &str = "webhook";

#[derive(Clone, Debug)]
pub struct WebhookClient {
    http: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self { Self { http, url: url.into() } }

    pub async fn send(&self, event: OrderEvent) -> Result<()> {
        let order_id = event.order_id().to_string();
        let envelope = EventEnvelope::new(event);
        let response = self.http.post(&self.url).json(&envelope).send().await?;
        ensure_success(SERVICE, response).await?;
        tracing::info!(order_id = %order_id, event_id = %envelope.id, "webhook delivered");
        Ok(())
    }
}
