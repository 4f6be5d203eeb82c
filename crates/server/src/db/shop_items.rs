//! Catalog persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use atelier_core::ShopItemId;

use super::{RepositoryError, conflict_on_unique, decode_doc, decode_docs};
use crate::models::{ShopItem, ShopItemPatch};

/// Listing order shared by every catalog query.
const CATALOG_ORDER: &str = "ORDER BY (doc->>'position')::int NULLS LAST, id";

/// Storage for catalog items.
///
/// Listings are sorted by position, positioned items first, then by id.
#[async_trait]
pub trait ShopItemRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<ShopItem>, RepositoryError>;

    async fn find_by_id(&self, id: &ShopItemId) -> Result<Option<ShopItem>, RepositoryError>;

    /// Items tagged with `category`.
    async fn find_by_category(&self, category: &str) -> Result<Vec<ShopItem>, RepositoryError>;

    /// Items whose collection name equals `collection`.
    async fn find_by_collection(&self, collection: &str)
    -> Result<Vec<ShopItem>, RepositoryError>;

    async fn create(&self, item: ShopItem) -> Result<ShopItem, RepositoryError>;

    /// Replace the supplied top-level fields, returning the updated item.
    async fn update(
        &self,
        id: &ShopItemId,
        patch: ShopItemPatch,
    ) -> Result<Option<ShopItem>, RepositoryError>;

    /// Remove an item. Returns whether one was removed.
    async fn delete(&self, id: &ShopItemId) -> Result<bool, RepositoryError>;

    async fn update_photos(
        &self,
        id: &ShopItemId,
        photos: Vec<String>,
    ) -> Result<Option<ShopItem>, RepositoryError>;
}

/// `PostgreSQL` catalog repository.
pub struct PgShopItemRepository {
    pool: PgPool,
}

impl PgShopItemRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_sorted(
        &self,
        filter: &str,
        arg: Option<&str>,
    ) -> Result<Vec<ShopItem>, RepositoryError> {
        let sql = format!("SELECT doc FROM shop_items {filter} {CATALOG_ORDER}");
        let mut query = sqlx::query_scalar::<_, serde_json::Value>(&sql);
        if let Some(arg) = arg {
            query = query.bind(arg.to_owned());
        }
        let docs = query.fetch_all(&self.pool).await?;
        decode_docs(docs)
    }
}

#[async_trait]
impl ShopItemRepository for PgShopItemRepository {
    async fn find_all(&self) -> Result<Vec<ShopItem>, RepositoryError> {
        self.fetch_sorted("", None).await
    }

    async fn find_by_id(&self, id: &ShopItemId) -> Result<Option<ShopItem>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM shop_items WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode_doc).transpose()
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<ShopItem>, RepositoryError> {
        self.fetch_sorted("WHERE doc->'categories' ? $1", Some(category))
            .await
    }

    async fn find_by_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<ShopItem>, RepositoryError> {
        self.fetch_sorted("WHERE doc->>'collectionName' = $1", Some(collection))
            .await
    }

    async fn create(&self, item: ShopItem) -> Result<ShopItem, RepositoryError> {
        sqlx::query("INSERT INTO shop_items (id, doc) VALUES ($1, $2)")
            .bind(&item.id)
            .bind(Json(&item))
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "shop item id already exists"))?;
        Ok(item)
    }

    async fn update(
        &self,
        id: &ShopItemId,
        patch: ShopItemPatch,
    ) -> Result<Option<ShopItem>, RepositoryError> {
        let doc: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            UPDATE shop_items
            SET doc = doc || $2, updated_at = now()
            WHERE id = $1
            RETURNING doc
            ",
        )
        .bind(id)
        .bind(Json(&patch))
        .fetch_optional(&self.pool)
        .await?;
        doc.map(decode_doc).transpose()
    }

    async fn delete(&self, id: &ShopItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_photos(
        &self,
        id: &ShopItemId,
        photos: Vec<String>,
    ) -> Result<Option<ShopItem>, RepositoryError> {
        let doc: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            UPDATE shop_items
            SET doc = jsonb_set(doc, '{photos}', $2), updated_at = now()
            WHERE id = $1
            RETURNING doc
            ",
        )
        .bind(id)
        .bind(Json(&photos))
        .fetch_optional(&self.pool)
        .await?;
        doc.map(decode_doc).transpose()
    }
}
