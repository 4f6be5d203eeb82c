//! Persistence for orders, catalog, promos, certificates and users.
//!
//! Every entity has an async repository trait with two implementations:
//!
//! - `Pg*Repository` stores one `JSONB` document per row, with the lookup
//!   key copied into its own column.
//! - [`memory`] keeps seeded fixture data in process memory. It backs the
//!   server when no database is configured and backs the tests.
//!
//! # Tables
//!
//! - `orders` - keyed by `order_id`
//! - `shop_items` - keyed by `id`
//! - `promos` - looked up by `name`
//! - `certificates` - looked up by `code`
//! - `users` - unique on `lower(email)`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod certificates;
pub mod memory;
pub mod orders;
pub mod promos;
pub mod shop_items;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use certificates::{CertificateRepository, PgCertificateRepository};
pub use orders::{OrderRepository, PgOrderRepository};
pub use promos::{PgPromoRepository, PromoRepository};
pub use shop_items::{PgShopItemRepository, ShopItemRepository};
pub use users::{PgUserRepository, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Password could not be hashed before storing.
    #[error("password hashing failed")]
    PasswordHash,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Handles to every repository, resolved once at start-up.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderRepository>,
    pub shop_items: Arc<dyn ShopItemRepository>,
    pub promos: Arc<dyn PromoRepository>,
    pub certificates: Arc<dyn CertificateRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Fresh in-memory repositories seeded with fixture data.
    ///
    /// Each call returns an independent set of stores.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            orders: Arc::new(memory::InMemoryOrderRepository::seeded()),
            shop_items: Arc::new(memory::InMemoryShopItemRepository::seeded()),
            promos: Arc::new(memory::InMemoryPromoRepository::seeded()),
            certificates: Arc::new(memory::InMemoryCertificateRepository::seeded()),
            users: Arc::new(memory::InMemoryUserRepository::seeded()),
        }
    }

    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            shop_items: Arc::new(PgShopItemRepository::new(pool.clone())),
            promos: Arc::new(PgPromoRepository::new(pool.clone())),
            certificates: Arc::new(PgCertificateRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
        }
    }
}

// =============================================================================
// Document helpers
// =============================================================================

/// Decode a stored `JSONB` document.
fn decode_doc<T: DeserializeOwned>(doc: serde_json::Value) -> Result<T, RepositoryError> {
    serde_json::from_value(doc)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid stored document: {e}")))
}

/// Decode a list of stored `JSONB` documents.
fn decode_docs<T: DeserializeOwned>(docs: Vec<serde_json::Value>) -> Result<Vec<T>, RepositoryError> {
    docs.into_iter().map(decode_doc).collect()
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Escape `LIKE` wildcards so the input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
