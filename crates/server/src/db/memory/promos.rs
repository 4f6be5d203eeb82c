//! In-memory promo store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use atelier_core::PromoCode;

use super::fixtures;
use crate::db::{PromoRepository, RepositoryError};
use crate::models::PromoItem;

/// In-memory promo store.
#[derive(Default)]
pub struct InMemoryPromoRepository {
    promos: RwLock<Vec<PromoItem>>,
}

impl InMemoryPromoRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the fixture promo codes.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            promos: RwLock::new(fixtures::promos()),
        }
    }
}

#[async_trait]
impl PromoRepository for InMemoryPromoRepository {
    async fn find_by_code(&self, code: &PromoCode) -> Result<Option<PromoItem>, RepositoryError> {
        let promos = self.promos.read().await;
        Ok(promos.iter().find(|p| &p.name == code).cloned())
    }

    async fn create(&self, promo: PromoItem) -> Result<PromoItem, RepositoryError> {
        self.promos.write().await.push(promo.clone());
        Ok(promo)
    }
}
