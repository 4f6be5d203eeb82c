//! Atelier backend library.
//!
//! Order placement and payment approval, promo codes, gift certificates,
//! accounts, catalog management and media uploads for a clothing label.
//! The binary in `main.rs` wires configuration into [`app`]; the integration
//! tests drive the same router over in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cloudinary;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use axum::{Router, http::HeaderValue};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Build the CORS layer: a single allowed origin when configured,
/// permissive otherwise.
fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = allowed_origin.and_then(|origin| {
        HeaderValue::from_str(origin)
            .inspect_err(|e| tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin"))
            .ok()
    });

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// Build the application router with request tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config().cors_allowed_origin.as_deref());

    routes::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn test_app_allows_any_origin_by_default() {
        let app = app(TestContext::new().state);

        let response = app
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://shop.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_layer_restricts_to_configured_origin() {
        let app = routes::routes()
            .with_state(TestContext::new().state)
            .layer(cors_layer(Some("https://atelier.example.com")));

        let response = app
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://elsewhere.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://atelier.example.com"
        );
    }
}
