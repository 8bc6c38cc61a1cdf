//! Clients for the external services the handlers proxy

pub mod shiplogic;
pub mod supabase;
pub mod webhook;

pub use shiplogic::ShiplogicClient;
pub use supabase::SupabaseClient;
pub use webhook::WebhookClient;

use crate::{Result, StorefrontError};

/// Turns a non-2xx response into `StorefrontError::Upstream`, keeping the body.
pub(crate) async fn ensure_success(service: &'static str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(service, status = status.as_u16(), body = %body, "upstream request failed");
    Err(StorefrontError::Upstream { service, status: status.as_u16(), body })
}
