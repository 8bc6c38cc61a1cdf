#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use storefront_functions::config::PayfastConfig;
use storefront_functions::{router, AppState, Config};
use tower::ServiceExt;

pub const SERVICE_KEY: &str = "service-role-key";
pub const ADMIN_SECRET: &str = "admin-s3cret";

pub fn config(base_url: &str) -> Config {
    Config {
        port: 0,
        supabase_url: Some(base_url.to_string()),
        supabase_service_key: Some(SERVICE_KEY.to_string()),
        admin_secret: Some(ADMIN_SECRET.to_string()),
        payfast: PayfastConfig {
            merchant_id: Some("10000100".into()),
            merchant_key: Some("46f0cd694581a".into()),
            passphrase: Some("jt7NOE43FZPn".into()),
            sandbox: true,
            return_url: Some("https://shop.example.com/checkout/success".into()),
            cancel_url: Some("https://shop.example.com/checkout/cancel".into()),
            notify_url: Some("https://shop.example.com/payfast-notify".into()),
        },
        shiplogic_url: base_url.to_string(),
        shiplogic_api_key: Some("ship-key".to_string()),
        status_webhook_url: Some(format!("{base_url}/webhook/order-status")),
        invoice_webhook_url: Some(format!("{base_url}/webhook/invoice")),
    }
}

pub async fn send(config: Config, request: Request<Body>) -> (StatusCode, Value) {
    let app = router(AppState::new(config));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
