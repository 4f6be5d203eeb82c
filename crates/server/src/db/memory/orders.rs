//! In-memory order store.
//!
//! Email search is a case-insensitive substring match, like the
//! `PostgreSQL` `ILIKE` query.

use async_trait::async_trait;
use tokio::sync::RwLock;

use atelier_core::OrderId;

use super::fixtures;
use crate::db::{OrderRepository, RepositoryError};
use crate::models::Order;

/// In-memory order store.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the fixture orders.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_orders(fixtures::orders())
    }

    /// Store holding exactly `orders`.
    #[must_use]
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: RwLock::new(orders),
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.orders.read().await.clone())
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| &o.order_id == order_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.email.contains_ignore_case(email))
            .cloned()
            .collect())
    }

    async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(RepositoryError::Conflict(
                "order id already exists".to_owned(),
            ));
        }
        orders.push(order.clone());
        Ok(order)
    }

    async fn delete(&self, order_id: &OrderId) -> Result<bool, RepositoryError> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| &o.order_id != order_id);
        Ok(orders.len() != before)
    }

    async fn update_approval(
        &self,
        order_id: &OrderId,
        approved: bool,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut orders = self.orders.write().await;
        Ok(orders
            .iter_mut()
            .find(|o| &o.order_id == order_id)
            .map(|order| {
                order.approved = approved;
                order.clone()
            }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive_substring() {
        let repo = InMemoryOrderRepository::seeded();

        let found = repo.find_by_email("CUSTOMER@example").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_id.as_str(), "ORD-001");

        // "example.com" is in every fixture email
        assert_eq!(repo.find_by_email("example.com").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_by_email_treats_input_literally() {
        let repo = InMemoryOrderRepository::seeded();
        assert!(repo.find_by_email(".*").await.unwrap().is_empty());
        assert!(repo.find_by_email("customer@example(").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let repo = InMemoryOrderRepository::seeded();
        let existing = repo
            .find_by_id(&OrderId::new("ORD-001"))
            .await
            .unwrap()
            .unwrap();

        let result = repo.create(existing).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_approval_and_delete() {
        let repo = InMemoryOrderRepository::seeded();
        let id = OrderId::new("ORD-003");

        let updated = repo.update_approval(&id, true).await.unwrap().unwrap();
        assert!(updated.approved);
        assert!(repo.update_approval(&OrderId::new("nope"), true).await.unwrap().is_none());

        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.delete(&id).await.unwrap());
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }
}
