use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use serde_json::Value;

use super::AppState;
use crate::domain::value_objects::SearchTerm;
use crate::{Result, StorefrontError};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct PostalSearchParams {
    #[serde(alias = "query")]
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// PostgREST `or` filter matching suburb or city anywhere, or a postal code prefix.
pub fn postal_filter(term: &SearchTerm) -> String {
    let t = term.as_str();
    format!("(suburb.ilike.*{t}*,city.ilike.*{t}*,postal_code.ilike.{t}*)")
}

pub async fn search(State(state): State<AppState>, Query(params): Query<PostalSearchParams>) -> Result<Json<Value>> {
    let term = SearchTerm::new(params.q.as_deref().unwrap_or_default()).map_err(|e| StorefrontError::bad_request(e.to_string()))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let supabase = state.supabase()?;

    let rows: Vec<Value> = supabase
        .select(
            "postal_codes",
            &[
                ("select", "postal_code,suburb,city,province".to_string()),
                ("or", postal_filter(&term)),
                ("order", "suburb.asc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;
    tracing::debug!(term = term.as_str(), count = rows.len(), "postal search");
    Ok(Json(serde_json::json!({ "results": rows })))
}
