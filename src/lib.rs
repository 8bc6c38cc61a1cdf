//! Storefront Functions - backend glue for the storefront
//!
//! Stateless HTTP handlers in front of the hosted database, the payment
//! gateway, the shipping carrier and the automation webhooks.
//!
//! ## Features
//! - Coupon validation against a cart
//! - PayFast checkout signing and ITN handling
//! - Order status administration with webhook forwarding
//! - Pickup point lookup and shipment tracking
//! - Customer order history and postal code search
//! - Backfill and import jobs

pub mod config;
pub mod domain;
pub mod handlers;
pub mod jobs;
pub mod logging;
pub mod payfast;
pub mod upstream;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

pub use config::Config;
pub use handlers::{router, AppState};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Upstream {service} returned {status}")]
    Upstream { service: &'static str, status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    pub fn bad_request(message: impl Into<String>) -> Self { Self::BadRequest(message.into()) }
    pub fn not_found(message: impl Into<String>) -> Self { Self::NotFound(message.into()) }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::MissingConfig(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind used as the `error` field of the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingConfig(_) => "missing_config",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Upstream { .. } | Self::Http(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = errors.field_errors().keys().map(|k| k.to_string()).collect();
        Self::BadRequest(format!("Invalid fields: {}", fields.join(", ")))
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        } else {
            tracing::warn!(kind = self.kind(), "{}", self);
        }

        let mut body = json!({ "error": self.kind(), "message": self.to_string() });
        if let Self::Upstream { body: upstream, .. } = &self {
            // Pass the upstream body through, as JSON when it parses.
            body["details"] = serde_json::from_str(upstream).unwrap_or_else(|_| json!(upstream));
        }
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
