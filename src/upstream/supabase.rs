//! Supabase REST (PostgREST), RPC and auth calls with the service-role key

use reqwest::{header, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::ensure_success;
use crate::config::{require, Config};
use crate::{Result, StorefrontError};

const SERVICE: &str = "supabase";

#[derive(Clone, Debug)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(http: Client, base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), service_key: service_key.into() }
    }

    pub fn from_config(http: Client, config: &Config) -> Result<Self> {
        let url = require(&config.supabase_url, "SUPABASE_URL")?;
        let key = require(&config.supabase_service_key, "SUPABASE_SERVICE_ROLE_KEY")?;
        Ok(Self::new(http, url, key))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.service_key).bearer_auth(&self.service_key)
    }

    fn rest_url(&self, table: &str) -> String { format!("{}/rest/v1/{}", self.base_url, table) }

    /// `GET /rest/v1/<table>?<query>`
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        tracing::debug!(table, ?query, "supabase select");
        let response = self.authorized(self.http.get(self.rest_url(table))).query(query).send().await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    /// First row matching the query, if any.
    pub async fn select_one<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Option<T>> {
        let mut query = query.to_vec();
        query.push(("limit", "1".to_string()));
        Ok(self.select(table, &query).await?.into_iter().next())
    }

    /// `PATCH /rest/v1/<table>?<filter>` returning the updated rows.
    pub async fn update<B: Serialize + ?Sized>(&self, table: &str, filter: &[(&str, String)], body: &B) -> Result<Vec<Value>> {
        tracing::debug!(table, ?filter, "supabase update");
        let response = self
            .authorized(self.http.patch(self.rest_url(table)))
            .query(filter)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    /// Bulk insert. Rows that collide with an existing key are skipped.
    pub async fn insert_ignore_duplicates<B: Serialize + ?Sized>(&self, table: &str, rows: &B) -> Result<()> {
        let response = self
            .authorized(self.http.post(self.rest_url(table)))
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    /// `POST /rest/v1/rpc/<function>`
    pub async fn rpc<A: Serialize + ?Sized>(&self, function: &str, args: &A) -> Result<Value> {
        tracing::debug!(function, "supabase rpc");
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let response = self.authorized(self.http.post(url)).json(args).send().await?;
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }

    /// Resolves the user behind a customer access token. A rejected token is `Unauthorized`.
    pub async fn auth_user(&self, access_token: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .http
            .get(url)
            .header("apikey", &self.service_key)
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        if matches!(response.status().as_u16(), 401 | 403) {
            return Err(StorefrontError::Unauthorized("Invalid or expired session".into()));
        }
        Ok(ensure_success(SERVICE, response).await?.json().await?)
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AuthUser {
    pub id: String,
}

/// PostgREST `eq.` filter value.
pub fn eq(value: impl std::fmt::Display) -> String { format!("eq.{value}") }
