//! Support form and health checks over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use atelier_integration_tests::TestApp;
use atelier_server::email::SUBJECT_SUPPORT;

#[tokio::test]
async fn test_support_request_is_forwarded_to_admin() {
    let mut app = TestApp::new();

    let response = app
        .post_json(
            "/support",
            &json!({
                "email": "worried@example.com",
                "fullname": "Worried Customer",
                "message": "Where is my parcel?"
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());

    let email = app.outbox.next().await.unwrap();
    assert_eq!(email.to, "admin@example.com");
    assert_eq!(email.reply_to.as_deref(), Some("worried@example.com"));
    assert_eq!(email.subject, SUBJECT_SUPPORT);
    assert!(email.text_body.contains("Where is my parcel?"));
}

#[tokio::test]
async fn test_incomplete_support_request_is_rejected() {
    let mut app = TestApp::new();

    let cases = [
        json!({ "email": "bad", "fullname": "A", "message": "B" }),
        json!({ "email": "a@example.com", "fullname": " ", "message": "B" }),
        json!({ "email": "a@example.com", "fullname": "A" }),
    ];
    for body in cases {
        let response = app.post_json("/support", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_message(), "Something goes wrong. Try again later");
    }

    assert!(app.outbox.is_drained().await);
}

#[tokio::test]
async fn test_health_checks() {
    let app = TestApp::new();

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.text(), "ok");

    // No database behind the in-memory stores
    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/shop-items").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
