//! Order persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use atelier_core::OrderId;

use super::{RepositoryError, conflict_on_unique, decode_doc, decode_docs, escape_like};
use crate::models::Order;

/// Storage for placed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// All orders, oldest first.
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Look up an order by its reference.
    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Orders whose email contains `email`, case-insensitively.
    ///
    /// `email` is matched literally, never as a pattern.
    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, RepositoryError>;

    /// Store a new order.
    ///
    /// Returns `RepositoryError::Conflict` if the reference is taken.
    async fn create(&self, order: Order) -> Result<Order, RepositoryError>;

    /// Remove an order. Returns whether one was removed.
    async fn delete(&self, order_id: &OrderId) -> Result<bool, RepositoryError>;

    /// Set the approval flag, returning the updated order if it exists.
    async fn update_approval(
        &self,
        order_id: &OrderId,
        approved: bool,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// `PostgreSQL` order repository.
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let docs: Vec<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM orders ORDER BY created_at, order_id")
                .fetch_all(&self.pool)
                .await?;
        decode_docs(docs)
    }

    async fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM orders WHERE order_id = $1")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode_doc).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Order>, RepositoryError> {
        let docs: Vec<serde_json::Value> = sqlx::query_scalar(
            r"
            SELECT doc FROM orders
            WHERE doc->>'email' ILIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY created_at, order_id
            ",
        )
        .bind(escape_like(email))
        .fetch_all(&self.pool)
        .await?;
        decode_docs(docs)
    }

    async fn create(&self, order: Order) -> Result<Order, RepositoryError> {
        sqlx::query("INSERT INTO orders (order_id, doc) VALUES ($1, $2)")
            .bind(&order.order_id)
            .bind(Json(&order))
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "order id already exists"))?;
        Ok(order)
    }

    async fn delete(&self, order_id: &OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_approval(
        &self,
        order_id: &OrderId,
        approved: bool,
    ) -> Result<Option<Order>, RepositoryError> {
        let doc: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            UPDATE orders
            SET doc = jsonb_set(doc, '{approved}', to_jsonb($2::boolean)),
                updated_at = now()
            WHERE order_id = $1
            RETURNING doc
            ",
        )
        .bind(order_id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        doc.map(decode_doc).transpose()
    }
}
