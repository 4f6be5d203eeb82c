//! Checkout, payment approval and order administration over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use base64::Engine;
use serde_json::json;

use atelier_integration_tests::{TestApp, domestic_order, stock, worldwide_order};
use atelier_server::email::{SUBJECT_NEW_ORDER, SUBJECT_UNAPPROVED_ORDER, SUBJECT_YOUR_ORDER};

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_list_orders_returns_fixtures() {
    let app = TestApp::new();

    let response = app.get("/order").await;

    assert_eq!(response.status, StatusCode::OK);
    let orders = response.json();
    let ids: Vec<&str> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["orderId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["ORD-001", "ORD-002", "ORD-003"]);
}

#[tokio::test]
async fn test_domestic_checkout_notifies_admin() {
    let mut app = TestApp::new();

    let response = app
        .post_json("/order", &domestic_order("ORD-100", "PROD-001", "M"))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let order = response.json();
    assert_eq!(order["orderId"], "ORD-100");
    assert_eq!(order["approved"], false);
    assert_eq!(order["orderType"], "ukraine");
    assert_eq!(order["novaPoshta"], "42");

    let email = app.outbox.next().await.unwrap();
    assert_eq!(email.to, "admin@example.com");
    assert_eq!(email.subject, SUBJECT_UNAPPROVED_ORDER);

    // Stock only moves on approval
    assert_eq!(stock(&app, "PROD-001", "M").await, Some(8));
}

#[tokio::test]
async fn test_worldwide_checkout_sends_no_email() {
    let mut app = TestApp::new();

    let response = app
        .post_json("/order", &worldwide_order("ORD-101", "PROD-002", "S"))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["orderType"], "worldwide");
    assert!(app.outbox.is_drained().await);
}

#[tokio::test]
async fn test_checkout_generates_order_id_when_missing() {
    let app = TestApp::new();
    let mut body = domestic_order("unused", "PROD-002", "S");
    body.as_object_mut().unwrap().remove("orderId");

    let response = app.post_json("/order", &body).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert!(
        response.json()["orderId"]
            .as_str()
            .unwrap()
            .starts_with("ORD-")
    );
}

#[tokio::test]
async fn test_checkout_unknown_item_is_rejected() {
    let app = TestApp::new();

    let response = app
        .post_json("/order", &domestic_order("ORD-102", "NOPE", "M"))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Shop item with ID NOPE not found");
}

#[tokio::test]
async fn test_checkout_unlisted_size_is_accepted() {
    let app = TestApp::new();

    // PROD-003 lists only M and L
    let response = app
        .post_json("/order", &domestic_order("ORD-103", "PROD-003", "XS"))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_checkout_missing_shipping_field_is_rejected() {
    let app = TestApp::new();
    let mut body = worldwide_order("ORD-104", "PROD-002", "S");
    body["orderData"]["postalCode"] = json!("  ");

    let response = app.post_json("/order", &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_duplicate_order_id_conflicts() {
    let app = TestApp::new();

    let response = app
        .post_json("/order", &domestic_order("ORD-001", "PROD-002", "S"))
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

// ============================================================================
// Approval
// ============================================================================

#[tokio::test]
async fn test_wayforpay_approval_decrements_stock_and_emails() {
    let mut app = TestApp::new();

    let response = app
        .post_json(
            "/order/approve",
            &json!({ "orderReference": "ORD-001", "reasonCode": 1100, "transactionStatus": "Approved" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["approved"], true);
    assert_eq!(stock(&app, "PROD-001", "M").await, Some(7));

    let mut subjects = vec![
        app.outbox.next().await.unwrap().subject,
        app.outbox.next().await.unwrap().subject,
    ];
    subjects.sort();
    assert_eq!(subjects, [SUBJECT_NEW_ORDER, SUBJECT_YOUR_ORDER]);
}

#[tokio::test]
async fn test_wayforpay_form_encoded_callback() {
    let app = TestApp::new();
    let report = r#"{"orderReference":"ORD-003","reasonCode":1100}"#;
    let body: String = url_encode_key(report);

    let response = app.post_form("/order/approve", &body).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["orderId"], "ORD-003");
    assert_eq!(stock(&app, "PROD-003", "M").await, Some(2));
}

#[tokio::test]
async fn test_wayforpay_unsettled_payment_changes_nothing() {
    let mut app = TestApp::new();

    let response = app
        .post_json(
            "/order/approve",
            &json!({ "orderReference": "ORD-001", "reasonCode": 1101 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json().is_null());
    assert_eq!(stock(&app, "PROD-001", "M").await, Some(8));
    assert!(app.outbox.is_drained().await);
}

#[tokio::test]
async fn test_wayforpay_garbage_body_is_bad_request() {
    let app = TestApp::new();

    let response = app.post_form("/order/approve", "not-json").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_message(), "Invalid payment callback");
}

#[tokio::test]
async fn test_approval_is_not_repeated() {
    let app = TestApp::new();

    // ORD-002 is seeded as approved
    let response = app
        .post_json("/order/approve/admin", &json!({ "orderId": "ORD-002" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json().is_null());
    assert_eq!(stock(&app, "PROD-002", "L").await, Some(12));
}

#[tokio::test]
async fn test_admin_approval_of_unknown_order_returns_null() {
    let app = TestApp::new();

    let response = app
        .post_json("/order/approve/admin", &json!({ "orderId": "ORD-404" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json().is_null());
}

#[tokio::test]
async fn test_zero_stock_order_is_placed_but_not_approved() {
    let app = TestApp::new();
    app.put_json(
        "/shop-items-v2/PROD-002",
        &json!({ "amount": { "S": 0, "M": 15 } }),
    )
    .await;

    let created = app
        .post_json("/order", &domestic_order("ORD-105", "PROD-002", "S"))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);

    let approved = app
        .post_json("/order/approve/admin", &json!({ "orderId": "ORD-105" }))
        .await;
    assert_eq!(approved.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        approved.error_message(),
        "No S-size items of item with ID PROD-002 left"
    );

    let orders = app.get("/order").await.json();
    let order = orders
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["orderId"] == "ORD-105")
        .unwrap();
    assert_eq!(order["approved"], false);
}

#[tokio::test]
async fn test_liqpay_success_approves_order() {
    let app = TestApp::new();
    let data = base64::engine::general_purpose::STANDARD
        .encode(r#"{"order_id":"ORD-001","status":"success","amount":5000}"#);

    let response = app
        .post_form(
            "/order/approve/liqpay",
            &format!("data={}&signature=ignored", url_encode_value(&data)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["approved"], true);
    assert_eq!(stock(&app, "PROD-001", "M").await, Some(7));
}

#[tokio::test]
async fn test_liqpay_failure_is_ignored() {
    let app = TestApp::new();
    let data = base64::engine::general_purpose::STANDARD
        .encode(r#"{"order_id":"ORD-001","status":"failure"}"#);

    let response = app
        .post_form(
            "/order/approve/liqpay",
            &format!("data={}", url_encode_value(&data)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json().is_null());
    assert_eq!(stock(&app, "PROD-001", "M").await, Some(8));
}

#[tokio::test]
async fn test_partial_approval_failure_is_not_rolled_back() {
    let app = TestApp::new();
    app.put_json(
        "/shop-items-v2/PROD-002",
        &json!({ "amount": { "S": 0, "M": 15 } }),
    )
    .await;
    let mut body = domestic_order("ORD-106", "PROD-001", "M");
    body["items"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "PROD-002", "size": "S", "title": "Cotton T-Shirt" }));
    assert_eq!(app.post_json("/order", &body).await.status, StatusCode::CREATED);

    let response = app
        .post_json("/order/approve/admin", &json!({ "orderId": "ORD-106" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(stock(&app, "PROD-001", "M").await, Some(7));
    assert_eq!(stock(&app, "PROD-002", "S").await, Some(0));
}

#[tokio::test]
async fn test_approval_decrements_every_line() {
    let app = TestApp::new();
    let mut body = domestic_order("ORD-107", "PROD-003", "L");
    let line = body["items"][0].clone();
    body["items"].as_array_mut().unwrap().push(line);
    app.post_json("/order", &body).await;

    let response = app
        .post_json("/order/approve/admin", &json!({ "orderId": "ORD-107" }))
        .await;

    assert_eq!(response.json()["approved"], true);
    assert_eq!(stock(&app, "PROD-003", "L").await, Some(0));
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_undecodable_checkout_body_is_rejected_by_extractor() {
    let app = TestApp::new();
    let mut body = domestic_order("ORD-108", "PROD-001", "M");
    body["orderData"]["email"] = json!("not-an-email");

    let response = app.post_json("/order", &body).await;

    // Rejected before the handler runs, so the body is axum's plain text
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(serde_json::from_slice::<serde_json::Value>(&response.body).is_err());
    assert_eq!(app.get("/order").await.json().as_array().unwrap().len(), 3);
}

// ============================================================================
// Administration
// ============================================================================

#[tokio::test]
async fn test_success_redirects_permanently() {
    let app = TestApp::new();

    let response = app.post_form("/order/success", "").await;

    assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers[header::LOCATION],
        "http://localhost:3000/success"
    );
}

#[tokio::test]
async fn test_delete_order() {
    let app = TestApp::new();

    let first = app.delete("/order/ORD-001").await;
    let second = app.delete("/order/ORD-001").await;

    assert_eq!(first.json(), json!({ "deleted": true }));
    assert_eq!(second.json(), json!({ "deleted": false }));
    assert_eq!(app.get("/order").await.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_orders_by_partial_email_ignore_case() {
    let app = TestApp::new();

    let response = app.get("/order/by-email?email=EXAMPLE.COM").await;
    assert_eq!(response.json().as_array().unwrap().len(), 3);

    let response = app.get("/order/by-email?email=another").await;
    let orders = response.json();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["orderId"], "ORD-002");
}

#[tokio::test]
async fn test_orders_by_email_treats_wildcards_literally() {
    let app = TestApp::new();

    let response = app.get("/order/by-email?email=%25").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json().as_array().unwrap().is_empty());
}

// ============================================================================
// Helpers
// ============================================================================

/// Form body whose single key is `key`, the way WayForPay posts JSON.
fn url_encode_key(key: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_key_only(key)
        .finish()
}

fn url_encode_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
