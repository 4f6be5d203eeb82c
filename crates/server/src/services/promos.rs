//! Promo code lookup and creation.

use thiserror::Error;
use tracing::instrument;

use atelier_core::PromoCode;

use crate::db::{PromoRepository, RepositoryError};
use crate::models::PromoItem;

/// Errors from promo operations.
#[derive(Debug, Error)]
pub enum PromoError {
    /// No promo with this code.
    #[error("Incorrect promo code")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Promo service.
pub struct PromoService<'a> {
    promos: &'a dyn PromoRepository,
}

impl<'a> PromoService<'a> {
    /// Create a new promo service.
    #[must_use]
    pub const fn new(promos: &'a dyn PromoRepository) -> Self {
        Self { promos }
    }

    /// Look up a promo by code.
    ///
    /// # Errors
    ///
    /// Returns `PromoError::NotFound` if the code is unknown.
    pub async fn get_by_code(&self, code: &PromoCode) -> Result<PromoItem, PromoError> {
        self.promos
            .find_by_code(code)
            .await?
            .ok_or(PromoError::NotFound)
    }

    /// Store a promo.
    ///
    /// # Errors
    ///
    /// Returns `PromoError::Repository` if the store fails.
    #[instrument(skip(self), fields(name = %promo.name))]
    pub async fn create(&self, promo: PromoItem) -> Result<PromoItem, PromoError> {
        Ok(self.promos.create(promo).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::memory::InMemoryPromoRepository;

    #[tokio::test]
    async fn test_lookup_and_create() {
        let repo = InMemoryPromoRepository::seeded();
        let promos = PromoService::new(&repo);

        let summer = promos.get_by_code(&PromoCode::new("SUMMER10")).await.unwrap();
        assert_eq!(summer.discount, Decimal::from(10));

        let missing = promos.get_by_code(&PromoCode::new("SPRING5")).await;
        assert!(matches!(missing, Err(PromoError::NotFound)));

        promos
            .create(PromoItem {
                name: PromoCode::new("SPRING5"),
                discount: Decimal::from(5),
            })
            .await
            .unwrap();
        assert!(promos.get_by_code(&PromoCode::new("SPRING5")).await.is_ok());
    }
}
