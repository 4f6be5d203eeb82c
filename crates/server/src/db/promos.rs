//! Promo code persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use atelier_core::PromoCode;

use super::{RepositoryError, decode_doc};
use crate::models::PromoItem;

/// Storage for promo codes. Names are not unique; the oldest match wins.
#[async_trait]
pub trait PromoRepository: Send + Sync {
    async fn find_by_code(&self, code: &PromoCode) -> Result<Option<PromoItem>, RepositoryError>;

    async fn create(&self, promo: PromoItem) -> Result<PromoItem, RepositoryError>;
}

/// `PostgreSQL` promo repository.
pub struct PgPromoRepository {
    pool: PgPool,
}

impl PgPromoRepository {
    /// Create a new promo repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromoRepository for PgPromoRepository {
    async fn find_by_code(&self, code: &PromoCode) -> Result<Option<PromoItem>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM promos WHERE name = $1 ORDER BY id LIMIT 1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode_doc).transpose()
    }

    async fn create(&self, promo: PromoItem) -> Result<PromoItem, RepositoryError> {
        sqlx::query("INSERT INTO promos (name, doc) VALUES ($1, $2)")
            .bind(&promo.name)
            .bind(Json(&promo))
            .execute(&self.pool)
            .await?;
        Ok(promo)
    }
}
