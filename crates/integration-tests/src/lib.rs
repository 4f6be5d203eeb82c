//! Integration test harness for Atelier.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`.
//! Every [`TestApp`] owns fresh in-memory stores seeded with the fixture
//! catalog, a recording mailer and a fake media host, so tests neither need
//! a database nor share state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use atelier_server::testing::{FakeMediaHost, Outbox, TestContext};

pub use atelier_server::testing::FAKE_CLOUD_NAME;

/// Maximum response body read by [`TestApp::send`].
const MAX_BODY: usize = 16 * 1024 * 1024;

/// Boundary used by [`MultipartBody`].
const BOUNDARY: &str = "atelier-test-boundary";

/// The application router plus handles on its test doubles.
pub struct TestApp {
    router: Router,
    pub outbox: Outbox,
    pub media: Arc<FakeMediaHost>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let ctx = TestContext::new();
        Self {
            router: atelier_server::app(ctx.state),
            outbox: ctx.outbox,
            media: ctx.media,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), MAX_BODY)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(Method::POST, uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(json_request(Method::PUT, uri, body)).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_multipart(&self, uri: &str, body: MultipartBody) -> TestResponse {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, MultipartBody::content_type())
                .body(Body::from(body.finish()))
                .unwrap(),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `message` of a JSON error body.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_owned()
    }
}

/// Builder for `multipart/form-data` request bodies.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// Checkout body for a domestic order of one line.
#[must_use]
pub fn domestic_order(order_id: &str, item_id: &str, size: &str) -> Value {
    serde_json::json!({
        "orderId": order_id,
        "items": [{ "id": item_id, "size": size, "title": "Test item" }],
        "price": 5000,
        "orderType": "ukraine",
        "orderData": {
            "email": "buyer@example.com",
            "fullName": "Test Buyer",
            "phone": "+380501112233",
            "city": "Kyiv",
            "agreement": true,
            "currency": "uah",
            "novaPoshta": "42"
        },
        "delivery": 100
    })
}

/// Checkout body for an international order of one line.
#[must_use]
pub fn worldwide_order(order_id: &str, item_id: &str, size: &str) -> Value {
    serde_json::json!({
        "orderId": order_id,
        "items": [{ "id": item_id, "size": size, "title": "Test item" }],
        "price": 150,
        "orderType": "worldwide",
        "orderData": {
            "email": "abroad@example.com",
            "fullName": "Abroad Buyer",
            "phone": "+4915112345678",
            "city": "Berlin",
            "agreement": true,
            "currency": "eur",
            "countryCityRegion": "Germany",
            "postalCode": "10115",
            "address": "Invalidenstrasse 1"
        }
    })
}

/// Minimal catalog item body.
#[must_use]
pub fn shop_item(id: &str) -> Value {
    serde_json::json!({
        "id": id,
        "price": { "uah": 1500, "eur": 40 },
        "title": { "en": "Linen Shirt", "ua": "Лляна сорочка" },
        "amount": { "S": 2, "M": 0 },
        "collectionName": "Spring 2025",
        "categories": ["shirts"],
        "position": 10
    })
}

/// Stock of `size` for catalog item `id`.
pub async fn stock(app: &TestApp, id: &str, size: &str) -> Option<i64> {
    let item = app.get(&format!("/shop-items-v2/{id}")).await.json();
    item["amount"][size].as_i64()
}
