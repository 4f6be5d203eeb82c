//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (database ping when PostgreSQL backed)
//!
//! # Auth
//! POST   /auth/register                   - Create account
//! POST   /auth/login                      - Check credentials
//!
//! # Certificates
//! GET    /certificates                    - List
//! GET    /certificates/{code}             - Look up
//! POST   /certificates                    - Issue
//! DELETE /certificates/{code}             - Remove
//!
//! # Promos
//! GET    /promos/{code}                   - Look up
//! POST   /promos                          - Create
//!
//! # Orders
//! GET    /order                           - List
//! POST   /order                           - Checkout
//! POST   /order/approve                   - WayForPay callback
//! POST   /order/approve/admin             - Manual approval
//! POST   /order/approve/liqpay            - LiqPay callback
//! POST   /order/success                   - 301 to the storefront success page
//! GET    /order/by-email?email=           - Search by email
//! DELETE /order/{id}                      - Remove
//!
//! # Catalog
//! GET    /shop-items-v2[?category=|?collection=]
//! GET    /shop-items-v2/{id}
//! POST   /shop-items-v2
//! POST   /shop-items-v2/with-media        - Multipart: data + files
//! PUT    /shop-items-v2/{id}              - Partial update
//! DELETE /shop-items-v2/{id}
//! PUT    /shop-items-v2/{id}/photos
//!
//! # Media
//! POST   /media/shop-items/{id}/upload    - Multipart: files
//! POST   /media/banners/upload/{name}     - Multipart: file
//! DELETE /media/{*publicId}
//!
//! # Support
//! POST   /support
//! ```

pub mod auth;
pub mod certificates;
pub mod media;
pub mod multipart;
pub mod orders;
pub mod promos;
pub mod shop_items;
pub mod support;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Upper bound for multipart upload bodies.
pub const UPLOAD_BODY_LIMIT: usize = 100 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the certificate routes router.
pub fn certificate_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(certificates::index).post(certificates::create))
        .route(
            "/{code}",
            get(certificates::show).delete(certificates::delete),
        )
}

/// Create the promo routes router.
pub fn promo_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(promos::create))
        .route("/{code}", get(promos::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/approve", post(orders::approve))
        .route("/approve/admin", post(orders::approve_admin))
        .route("/approve/liqpay", post(orders::approve_liqpay))
        .route("/success", post(orders::success))
        .route("/by-email", get(orders::by_email))
        .route("/{id}", delete(orders::delete))
}

/// Create the catalog routes router.
pub fn shop_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop_items::index).post(shop_items::create))
        .route(
            "/with-media",
            post(shop_items::create_with_media).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/{id}",
            get(shop_items::show)
                .put(shop_items::update)
                .delete(shop_items::delete),
        )
        .route("/{id}/photos", put(shop_items::update_photos))
}

/// Create the media routes router.
pub fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/shop-items/{id}/upload", post(media::upload_shop_item))
        .route("/banners/upload/{name}", post(media::upload_banner))
        .route("/{*public_id}", delete(media::delete))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/certificates", certificate_routes())
        .nest("/promos", promo_routes())
        .nest("/order", order_routes())
        .nest("/shop-items-v2", shop_item_routes())
        .nest("/media", media_routes())
        .route("/support", post(support::submit))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity when serving from `PostgreSQL`.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
