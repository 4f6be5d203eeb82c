//! In-memory catalog store.
//!
//! Listings use [`ShopItem::catalog_order`](crate::models::ShopItem::catalog_order),
//! the same ordering the `PostgreSQL` query applies.

use async_trait::async_trait;
use tokio::sync::RwLock;

use atelier_core::ShopItemId;

use super::fixtures;
use crate::db::{RepositoryError, ShopItemRepository};
use crate::models::{ShopItem, ShopItemPatch};

/// In-memory catalog store.
#[derive(Default)]
pub struct InMemoryShopItemRepository {
    items: RwLock<Vec<ShopItem>>,
}

impl InMemoryShopItemRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the fixture catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_items(fixtures::shop_items())
    }

    /// Store holding exactly `items`, e.g. a fixture catalog with adjusted stock.
    #[must_use]
    pub fn with_items(items: Vec<ShopItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    async fn sorted_where(&self, keep: impl Fn(&ShopItem) -> bool + Send) -> Vec<ShopItem> {
        let mut matching: Vec<ShopItem> = self
            .items
            .read()
            .await
            .iter()
            .filter(|item| keep(item))
            .cloned()
            .collect();
        matching.sort_by(ShopItem::catalog_order);
        matching
    }
}

#[async_trait]
impl ShopItemRepository for InMemoryShopItemRepository {
    async fn find_all(&self) -> Result<Vec<ShopItem>, RepositoryError> {
        Ok(self.sorted_where(|_| true).await)
    }

    async fn find_by_id(&self, id: &ShopItemId) -> Result<Option<ShopItem>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| &item.id == id).cloned())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<ShopItem>, RepositoryError> {
        Ok(self
            .sorted_where(|item| item.categories.iter().any(|c| c == category))
            .await)
    }

    async fn find_by_collection(
        &self,
        collection: &str,
    ) -> Result<Vec<ShopItem>, RepositoryError> {
        Ok(self
            .sorted_where(|item| item.collection_name == collection)
            .await)
    }

    async fn create(&self, item: ShopItem) -> Result<ShopItem, RepositoryError> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(RepositoryError::Conflict(
                "shop item id already exists".to_owned(),
            ));
        }
        items.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: &ShopItemId,
        patch: ShopItemPatch,
    ) -> Result<Option<ShopItem>, RepositoryError> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|item| &item.id == id).map(|item| {
            patch.apply(item);
            item.clone()
        }))
    }

    async fn delete(&self, id: &ShopItemId) -> Result<bool, RepositoryError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        Ok(items.len() != before)
    }

    async fn update_photos(
        &self,
        id: &ShopItemId,
        photos: Vec<String>,
    ) -> Result<Option<ShopItem>, RepositoryError> {
        let mut items = self.items.write().await;
        Ok(items.iter_mut().find(|item| &item.id == id).map(|item| {
            item.photos = photos;
            item.clone()
        }))
    }
}
