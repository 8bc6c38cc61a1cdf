//! ShipLogic carrier API

use reqwest::Client;
use serde_json::Value;

use super::ensure_success;
use crate::config::{require, Config};
use crate::Result;

const SERVICE: &str = "shiplogic";

#[derive(Clone, Debug)]
pub struct ShiplogicClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ShiplogicClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), api_key: api_key.into() }
    }

    pub fn from_config(http: Client, config: &Config) -> Result<Self> {
        let key = require(&config.shiplogic_api_key, "SHIPLOGIC_API_KEY")?;
        Ok(Self::new(http, config.shiplogic_url.clone(), key))
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(path, ?query, "shiplogic request");
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    pub async fn pickup_points(&self, query: &[(&str, String)]) -> Result<Value> {
        self.get("/pickup-points", query).await
    }

    pub async fn track_shipment(&self, reference: &str) -> Result<Value> {
        self.get("/v2/tracking/shipments", &[("tracking_reference", reference.to_string())]).await
    }
}
