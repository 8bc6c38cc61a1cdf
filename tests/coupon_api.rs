mod common;

use axum::http::{Method, StatusCode};
use httpmock::prelude::*;
use serde_json::json;
use storefront_functions::Config;

#[tokio::test]
async fn test_valid_coupon_returns_discount_terms() {
    let server = MockServer::start_async().await;
    let rpc = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/rpc/apply_coupon")
                .header("apikey", common::SERVICE_KEY)
                .json_body(json!({
                    "p_code": "GLOW10",
                    "p_subtotal_cents": 2 * 19999 + 5000,
                    "p_items": [
                        {"product_id": "serum-1", "quantity": 2, "unit_price_cents": 19999},
                        {"product_id": "mask-2", "quantity": 1, "unit_price_cents": 5000}
                    ],
                    "p_user_id": null
                }));
            then.status(200).json_body(json!([{"valid": true, "discount_cents": 4500, "discount_type": "percent", "discount_value": 10}]));
        })
        .await;

    let body = json!({
        "code": " glow10 ",
        "cart": [
            {"product_id": "serum-1", "quantity": 2, "price": 199.99},
            {"id": "mask-2", "quantity": 1, "price": "50"}
        ]
    });
    let (status, response) = common::send(common::config(&server.base_url()), common::json_request(Method::POST, "/apply-coupon", &body)).await;

    rpc.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["valid"], true);
    assert_eq!(response["discount_cents"], 4500);
    assert_eq!(response["subtotal_cents"], 44998);
}

#[tokio::test]
async fn test_rejected_coupon_is_400_with_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/apply_coupon");
            then.status(200).json_body(json!({"valid": false, "message": "Coupon has expired"}));
        })
        .await;

    let body = json!({"code": "OLD", "cart": [{"product_id": "p", "quantity": 1, "price": 10}]});
    let (status, response) = common::send(common::config(&server.base_url()), common::json_request(Method::POST, "/apply-coupon", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({"valid": false, "message": "Coupon has expired"}));
}

#[tokio::test]
async fn test_missing_valid_flag_is_400() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/apply_coupon");
            then.status(200).json_body(json!({"discount_cents": 100}));
        })
        .await;

    let body = json!({"code": "X", "cart": [{"product_id": "p", "quantity": 1, "price": 10}]});
    let (status, response) = common::send(common::config(&server.base_url()), common::json_request(Method::POST, "/apply-coupon", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["valid"], false);
    assert_eq!(response["message"], "Invalid coupon code");
}

#[tokio::test]
async fn test_input_errors() {
    let server = MockServer::start_async().await;
    let config = common::config(&server.base_url());

    let (status, response) = common::send(config.clone(), common::json_request(Method::POST, "/apply-coupon", &json!({"code": "", "cart": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "bad_request");

    let (status, _) = common::send(config.clone(), common::json_request(Method::POST, "/apply-coupon", &json!({"code": "A", "cart": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let bad_qty = json!({"code": "A", "cart": [{"product_id": "p", "quantity": 0, "price": 1}]});
    let (status, response) = common::send(config, common::json_request(Method::POST, "/apply-coupon", &bad_qty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Cart item 1 has an invalid quantity");
}

#[tokio::test]
async fn test_missing_database_config_is_500() {
    let body = json!({"code": "A", "cart": [{"product_id": "p", "quantity": 1, "price": 1}]});
    let (status, response) = common::send(Config::default(), common::json_request(Method::POST, "/apply-coupon", &body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"], "missing_config");
}

#[tokio::test]
async fn test_coupon_raised_by_procedure_is_400() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/apply_coupon");
            then.status(400).json_body(json!({"code": "P0001", "message": "Coupon usage limit reached", "details": null, "hint": null}));
        })
        .await;

    let body = json!({"code": "MAXED", "cart": [{"product_id": "p", "quantity": 1, "price": 10}]});
    let (status, response) = common::send(common::config(&server.base_url()), common::json_request(Method::POST, "/apply-coupon", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({"valid": false, "message": "Coupon usage limit reached"}));
}

#[tokio::test]
async fn test_oversized_price_is_400() {
    let body = json!({"code": "A", "cart": [{"product_id": "p", "quantity": 1, "price": "50000000000000000000000000000"}]});
    let (status, response) = common::send(common::config("http://127.0.0.1:9"), common::json_request(Method::POST, "/apply-coupon", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Cart total out of range");
}

#[tokio::test]
async fn test_rpc_failure_is_502_with_passthrough() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/rpc/apply_coupon");
            then.status(404).json_body(json!({"code": "PGRST202", "message": "function not found"}));
        })
        .await;

    let body = json!({"code": "A", "cart": [{"product_id": "p", "quantity": 1, "price": 1}]});
    let (status, response) = common::send(common::config(&server.base_url()), common::json_request(Method::POST, "/apply-coupon", &body)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(response["details"]["code"], "PGRST202");
}
