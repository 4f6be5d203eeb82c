//! Order placement and payment approval.
//!
//! Approval decrements one unit of stock per line item, marks the order
//! approved and sends the confirmation emails. The steps run in sequence
//! without a transaction or lock: a failure part-way leaves earlier
//! decrements in place, and two concurrent approvals of the same order can
//! both pass the "already approved" check.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{OrderId, ShopItemId};

use crate::db::{OrderRepository, Repositories, RepositoryError, ShopItemRepository};
use crate::email::Notifier;
use crate::models::{
    CreateOrderRequest, LineItem, MissingShippingField, Order, ShopItemPatch, WayForPayCallback,
};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A line item references an unknown product.
    #[error("Shop item with ID {0} not found")]
    ShopItemNotFound(ShopItemId),

    /// A line item's size has no stock left.
    #[error("No {size}-size items of item with ID {id} left")]
    OutOfStock { id: ShopItemId, size: String },

    /// The shipping block does not match the order type.
    #[error(transparent)]
    MissingShipping(#[from] MissingShippingField),

    /// An order with this id already exists.
    #[error("Order {0} already exists")]
    AlreadyExists(OrderId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout rule: only a negative count blocks an order. A zero count is
/// accepted here and only rejected at approval.
const fn orderable(stock: Option<i64>) -> bool {
    !matches!(stock, Some(n) if n < 0)
}

/// Approval rule: the size must be listed with at least one unit.
///
/// A size missing from the stock map is rejected on purpose rather than
/// decremented into a meaningless count.
const fn approvable(stock: Option<i64>) -> bool {
    matches!(stock, Some(n) if n > 0)
}

/// Order service.
pub struct OrderService<'a> {
    orders: &'a dyn OrderRepository,
    shop_items: &'a dyn ShopItemRepository,
    notifier: &'a Notifier,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub fn new(repositories: &'a Repositories, notifier: &'a Notifier) -> Self {
        Self {
            orders: repositories.orders.as_ref(),
            shop_items: repositories.shop_items.as_ref(),
            notifier,
        }
    }

    /// All orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn get_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_all().await?)
    }

    /// Delete an order. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderError> {
        let deleted = self.orders.delete(order_id).await?;
        if deleted {
            tracing::info!(%order_id, "order deleted");
        }
        Ok(deleted)
    }

    /// Orders whose email contains `email`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn find_all_by_email(&self, email: &str) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_by_email(email).await?)
    }

    /// Place an unapproved order after checking every line item exists and
    /// is not sold out.
    ///
    /// Domestic orders notify the admin straight away; worldwide orders are
    /// only announced once paid.
    ///
    /// # Errors
    ///
    /// Returns a client error (`ShopItemNotFound`, `OutOfStock`,
    /// `MissingShipping`, `AlreadyExists`) for invalid checkouts and
    /// `OrderError::Repository` if the store fails.
    #[instrument(skip(self, request), fields(order_type = ?request.order_type, items = request.items.len()))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        for line in &request.items {
            self.check_orderable(line).await?;
        }

        let order_id = request
            .order_id
            .clone()
            .unwrap_or_else(|| OrderId::new(format!("ORD-{}", Uuid::new_v4().simple())));
        let order = request.into_order(order_id.clone(), Utc::now())?;

        let order = self.orders.create(order).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => OrderError::AlreadyExists(order_id),
            other => OrderError::Repository(other),
        })?;

        tracing::info!(order_id = %order.order_id, "order created");

        if order.is_domestic() {
            self.notifier.order_received(&order);
        }

        Ok(order)
    }

    async fn check_orderable(&self, line: &LineItem) -> Result<(), OrderError> {
        let item = self
            .shop_items
            .find_by_id(&line.id)
            .await?
            .ok_or_else(|| OrderError::ShopItemNotFound(line.id.clone()))?;

        if let Some(size) = &line.size
            && !orderable(item.stock(size))
        {
            return Err(OrderError::OutOfStock {
                id: line.id.clone(),
                size: size.clone(),
            });
        }
        Ok(())
    }

    /// Approve an order from a WayForPay callback.
    ///
    /// Returns `None` without touching anything unless the payment is
    /// settled and the order exists unapproved.
    ///
    /// # Errors
    ///
    /// Returns `ShopItemNotFound` or `OutOfStock` if a line item can no
    /// longer be fulfilled, `OrderError::Repository` if the store fails.
    #[instrument(skip(self, callback), fields(order_id = %callback.order_reference, reason_code = callback.reason_code))]
    pub async fn approve_order(
        &self,
        callback: &WayForPayCallback,
    ) -> Result<Option<Order>, OrderError> {
        if !callback.is_settled() {
            tracing::info!("payment not settled, ignoring callback");
            return Ok(None);
        }
        self.approve_pending(&callback.order_reference).await
    }

    /// Approve an order directly by id.
    ///
    /// # Errors
    ///
    /// Same as [`Self::approve_order`].
    #[instrument(skip(self))]
    pub async fn approve_order_admin(&self, order_id: &OrderId) -> Result<Option<Order>, OrderError> {
        self.approve_pending(order_id).await
    }

    async fn approve_pending(&self, order_id: &OrderId) -> Result<Option<Order>, OrderError> {
        let Some(order) = self.orders.find_by_id(order_id).await? else {
            tracing::info!(%order_id, "order not found, nothing to approve");
            return Ok(None);
        };
        if order.approved {
            tracing::info!(%order_id, "order already approved");
            return Ok(None);
        }

        for line in &order.items {
            self.take_one(line).await?;
        }

        let approved = self.orders.update_approval(order_id, true).await?;
        if let Some(order) = &approved {
            tracing::info!(%order_id, order_type = ?order.order_type(), "order approved");
            self.notifier.order_approved(order);
        }
        Ok(approved)
    }

    /// Remove one unit of the line item's size from stock.
    async fn take_one(&self, line: &LineItem) -> Result<(), OrderError> {
        let Some(size) = &line.size else {
            return Ok(());
        };

        let not_found = || OrderError::ShopItemNotFound(line.id.clone());
        let item = self.shop_items.find_by_id(&line.id).await?.ok_or_else(not_found)?;

        let stock = item.stock(size);
        if !approvable(stock) {
            return Err(OrderError::OutOfStock {
                id: line.id.clone(),
                size: size.clone(),
            });
        }

        let mut amount = item.amount;
        amount.insert(size.clone(), stock.unwrap_or_default() - 1);
        self.shop_items
            .update(&line.id, ShopItemPatch::amount(amount))
            .await?
            .ok_or_else(not_found)?;
        Ok(())
    }
}
